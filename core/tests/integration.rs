//! Full observation lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every client
//! operation over real HTTP through `UreqExecutor`. Validates that request
//! building and response parsing agree with the server's wire format,
//! including the string-encoded coordinates and the 201-on-write quirk.

use std::net::SocketAddr;

use chrono::{NaiveDate, TimeZone, Utc};
use naturalist_core::{
    ApiError, ClientConfig, CreateObservation, GeoPrivacy, NaturalistClient, ObservationQuery,
    Location, Operation, Rectangle, UpdateObservation, UreqExecutor,
};

/// Bind a random port and serve the mock API from a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn client(addr: SocketAddr) -> NaturalistClient {
    NaturalistClient::with_config(
        ClientConfig::new(&format!("http://{addr}/")).with_access_token("test-token"),
    )
}

#[test]
fn observation_lifecycle() {
    let addr = start_server();
    let client = client(addr);
    let http = UreqExecutor::new();

    // Step 1: list, should be empty.
    let page = client.list_observations(&http, None).unwrap();
    assert!(page.observations.is_empty(), "expected empty list");
    assert_eq!(page.paging.total_entries, Some(0));
    assert_eq!(page.paging.page, Some(1));

    // Step 2: create an observation with a location.
    let create_input = CreateObservation {
        species_guess: Some("Western Fence Lizard".to_string()),
        observed_on_string: Some(Utc.with_ymd_and_hms(2024, 4, 12, 16, 30, 0).unwrap()),
        latitude: Some(37.8716),
        longitude: Some(-122.2727),
        positional_accuracy: Some(15),
        tags: Some("reptile,berkeley".to_string()),
        geoprivacy: Some(GeoPrivacy::Open),
        ..Default::default()
    };
    let created = client.create_observation(&http, &create_input).unwrap();
    assert_eq!(created.species_guess.as_deref(), Some("Western Fence Lizard"));
    assert_eq!(created.latitude, Some(37.8716));
    assert_eq!(created.longitude, Some(-122.2727));
    assert_eq!(created.user_login.as_deref(), Some("mock-user"));
    assert_eq!(created.observed_on, NaiveDate::from_ymd_opt(2024, 4, 12));
    let id = created.id;

    // Step 3: a second observation without coordinates.
    let bare = CreateObservation {
        species_guess: Some("Unknown moth".to_string()),
        ..Default::default()
    };
    let bare = client.create_observation(&http, &bare).unwrap();
    assert!(bare.location().is_none());

    // Step 4: get the detailed view.
    let full = client.get_observation(&http, id).unwrap();
    assert_eq!(full.id, id);
    assert_eq!(full.uuid, created.uuid);
    assert_eq!(full.uri, created.uri);
    assert_eq!(full.user_login.as_deref(), Some("mock-user"));
    assert_eq!(full.observed_on, NaiveDate::from_ymd_opt(2024, 4, 12));
    assert_eq!(
        full.time_observed_at,
        Some(Utc.with_ymd_and_hms(2024, 4, 12, 16, 30, 0).unwrap())
    );
    assert_eq!(
        full.location(),
        Some(Location::new(-122.2727, 37.8716))
    );
    assert!(full.observation_photos.is_empty());
    assert!(full.comments.is_empty());
    assert!(full.project_observations.is_empty());
    assert!(full.created_at.is_some());

    // Step 5: the summary view of the same resource.
    let summary = client.get_observation_summary(&http, id).unwrap();
    assert_eq!(summary.id, id);
    assert_eq!(summary.positional_accuracy, Some(15));
    let observed = summary.try_parse_observed_on().unwrap();
    assert_eq!(observed, Utc.with_ymd_and_hms(2024, 4, 12, 16, 30, 0).unwrap());

    // Step 6: partial update; untouched fields survive.
    let update = UpdateObservation {
        description: Some("Basking on a fence post".to_string()),
        ..UpdateObservation::new(id)
    };
    client.update_observation(&http, &update).unwrap();
    let summary = client.get_observation_summary(&http, id).unwrap();
    assert_eq!(summary.description.as_deref(), Some("Basking on a fence post"));
    assert_eq!(summary.species_guess.as_deref(), Some("Western Fence Lizard"));

    // Step 7: list by the authenticated user's login.
    let mine = client.list_observations_by_username(&http, "mock-user").unwrap();
    assert_eq!(mine.observations.len(), 2);
    let nobody = client.list_observations_by_username(&http, "nobody").unwrap();
    assert!(nobody.observations.is_empty());

    // Step 8: filtered listing.
    let query = ObservationQuery {
        per_page: Some(1),
        has_geo: Some(true),
        rectangle: Some(Rectangle::new(
            Location::new(-123.0, 37.0),
            Location::new(-122.0, 38.0),
        )),
        ..Default::default()
    };
    let page = client.list_observations(&http, Some(&query)).unwrap();
    assert_eq!(page.paging.total_entries, Some(1));
    assert_eq!(page.paging.per_page, Some(1));
    assert_eq!(page.paging.total_pages(), Some(1));
    assert_eq!(page.observations[0].id, id);

    // Step 9: delete, acknowledged with 201.
    client.delete_observation(&http, id).unwrap();

    // Step 10: get after delete is a 404.
    let err = client.get_observation(&http, id).unwrap_err();
    assert!(err.is_not_found(), "expected 404, got {err}");
    assert_eq!(err.operation(), Some(Operation::GetObservation));

    // Step 11: deleting again reports the unexpected status.
    let err = client.delete_observation(&http, id).unwrap_err();
    match err {
        ApiError::UnexpectedStatus {
            expected, status, ..
        } => {
            assert_eq!(expected, 201);
            assert_eq!(status, 404);
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }

    // Step 12: only the bare observation remains.
    let page = client.list_observations(&http, None).unwrap();
    assert_eq!(page.paging.total_entries, Some(1));
    assert_eq!(page.observations[0].id, bare.id);
}

#[test]
fn writes_without_token_are_rejected() {
    let addr = start_server();
    let anonymous = NaturalistClient::new(&format!("http://{addr}"));
    let http = UreqExecutor::new();

    let err = anonymous
        .create_observation(&http, &CreateObservation::default())
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    // Reads stay public.
    let page = anonymous.list_observations(&http, None).unwrap();
    assert!(page.observations.is_empty());
}

#[test]
fn unreachable_server_is_transport_error() {
    // Bind and drop to get a port with nothing listening.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = NaturalistClient::new(&format!("http://{addr}"));

    let err = client
        .list_observations(&UreqExecutor::new(), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
}
