//! Request/response behaviour of the camera client against an in-memory bridge.

use std::sync::{Arc, Mutex};

use gapkit_bridge::{BridgeCommand, HostValue, MemoryBridge};
use gapkit_camera::{
    CallbackKind, CameraClient, CameraError, CameraOptions, Delivery, DestinationType, Picture,
    SourceType,
};
use serde_json::{Value, json};

type Log = Arc<Mutex<Vec<String>>>;

fn host_fn(log: &Log) -> HostValue {
    let log = log.clone();
    HostValue::function(move |arg| log.lock().unwrap().push(arg))
}

fn recorder() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn args(command: &BridgeCommand) -> Vec<Value> {
    assert_eq!(command.service, "Camera");
    assert_eq!(command.action, "takePicture");
    command.args.clone()
}

#[test]
fn missing_fields_use_defaults() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();

    client
        .request_from_host(host_fn(&success), HostValue::Undefined, &json!({}))
        .unwrap();

    let command = client.bridge().last().unwrap();
    assert_eq!(args(&command), vec![json!(80), json!(0), json!(1)]);
}

#[test]
fn fractional_quality_below_one_is_not_sent_as_zero() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();

    client
        .request_from_host(host_fn(&success), HostValue::Undefined, &json!({ "quality": 0.5 }))
        .unwrap();

    let command = client.bridge().last().unwrap();
    assert_eq!(args(&command), vec![json!(80), json!(0), json!(1)]);
}

#[test]
fn non_numeric_source_type_falls_back_to_camera() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();

    client
        .request_from_host(
            host_fn(&success),
            HostValue::Null,
            &json!({ "quality": 30, "sourceType": "library" }),
        )
        .unwrap();

    let command = client.bridge().last().unwrap();
    assert_eq!(args(&command), vec![json!(30), json!(0), json!(1)]);
}

#[test]
fn non_callable_success_is_rejected() {
    let client = CameraClient::new(MemoryBridge::new());

    for bad in [HostValue::Undefined, HostValue::from("callback"), HostValue::from(1.0)] {
        let found = bad.type_name();
        let result = client.request_from_host(bad, HostValue::Undefined, &json!({}));
        assert_eq!(result, Err(CameraError::SuccessCallbackNotCallable { found }));
    }

    assert!(client.bridge().is_empty());
    assert_eq!(client.pending_request(), None);
}

#[test]
fn non_callable_error_is_rejected() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();

    let result = client.request_from_host(host_fn(&success), HostValue::from(5.0), &json!({}));
    assert_eq!(
        result,
        Err(CameraError::ErrorCallbackNotCallable { found: "number" })
    );
    assert!(client.bridge().is_empty());
    assert_eq!(client.pending_request(), None);
}

#[test]
fn rejected_request_keeps_previous_callbacks() {
    let client = CameraClient::new(MemoryBridge::new());
    let first = recorder();

    client
        .request_from_host(host_fn(&first), HostValue::Undefined, &json!({}))
        .unwrap();
    let rejected = client.request_from_host(HostValue::Null, HostValue::Undefined, &json!({}));
    assert!(rejected.is_err());

    client.on_success("still mine");
    assert_eq!(entries(&first), vec!["still mine"]);
    assert_eq!(client.bridge().len(), 1);
}

#[test]
fn falsy_error_counts_as_absent() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();

    let result = client.request_from_host(host_fn(&success), HostValue::from(false), &json!({}));
    assert!(result.is_ok());
    assert_eq!(client.dispatch_error("boom"), Ok(Delivery::Unclaimed));
}

#[test]
fn responses_reach_the_callbacks_once() {
    let client = CameraClient::new(MemoryBridge::new());
    let success = recorder();
    let error = recorder();

    client
        .request_from_host(host_fn(&success), host_fn(&error), &json!({}))
        .unwrap();

    client.on_success("abc");
    client.on_error("boom");

    assert_eq!(entries(&success), vec!["abc"]);
    assert_eq!(entries(&error), vec!["boom"]);
}

#[test]
fn panicking_callback_does_not_escape() {
    let client = CameraClient::new(MemoryBridge::new());
    client.request(
        |_| panic!("user callback failed"),
        Some(|_| panic!("user error callback failed")),
        CameraOptions::default(),
    );

    client.on_success("x");
    client.on_error("y");

    assert!(matches!(
        client.dispatch_error("z"),
        Err(CameraError::CallbackPanicked {
            kind: CallbackKind::Error,
            ..
        })
    ));
}

#[test]
fn explicit_options_are_forwarded() {
    let client = CameraClient::new(MemoryBridge::new());
    let cb1 = recorder();

    client
        .request_from_host(
            host_fn(&cb1),
            HostValue::Null,
            &json!({ "quality": 50, "destinationType": 1, "sourceType": 1 }),
        )
        .unwrap();

    let command = client.bridge().last().unwrap();
    assert_eq!(args(&command), vec![json!(50), json!(1), json!(1)]);
    assert_eq!(
        client.last_options(),
        Some(
            CameraOptions::new()
                .with_quality(50)
                .with_destination(DestinationType::FileUri)
                .with_source(SourceType::Camera)
        )
    );

    client.on_success("ZZZ");
    assert_eq!(entries(&cb1), vec!["ZZZ"]);
}

#[test]
fn second_request_takes_over_pending_callbacks() {
    let client = CameraClient::new(MemoryBridge::new());
    let (cb1, cb2, cb3, cb4) = (recorder(), recorder(), recorder(), recorder());

    client
        .request_from_host(host_fn(&cb1), host_fn(&cb2), &json!({}))
        .unwrap();
    assert_eq!(
        args(&client.bridge().last().unwrap()),
        vec![json!(80), json!(0), json!(1)]
    );

    client
        .request_from_host(host_fn(&cb3), host_fn(&cb4), &json!({}))
        .unwrap();
    client.on_success("X");

    assert_eq!(entries(&cb3), vec!["X"]);
    assert!(entries(&cb1).is_empty());
    assert!(entries(&cb2).is_empty());
    assert_eq!(client.bridge().len(), 2);
}

#[test]
fn tagged_responses_do_not_cross_deliver() {
    let client = CameraClient::new(MemoryBridge::new());
    let (cb1, cb3) = (recorder(), recorder());

    let first = client
        .request_from_host(host_fn(&cb1), HostValue::Undefined, &json!({}))
        .unwrap();
    let second = client
        .request_from_host(host_fn(&cb3), HostValue::Undefined, &json!({}))
        .unwrap();

    client.on_success_for(first, "late");
    client.on_success_for(second, "fresh");

    assert!(entries(&cb1).is_empty());
    assert_eq!(entries(&cb3), vec!["fresh"]);

    let echoed: Vec<_> = client
        .bridge()
        .commands()
        .iter()
        .map(|c| c.callback_id)
        .collect();
    assert_eq!(echoed, vec![Some(first.get()), Some(second.get())]);
}

#[tokio::test]
async fn take_picture_resolves_with_payload() {
    let client = Arc::new(CameraClient::new(MemoryBridge::new()));
    let picture = client.take_picture(CameraOptions::new().with_destination(DestinationType::FileUri));

    let native = client.clone();
    tokio::spawn(async move { native.on_success("file:///photo.jpg") });

    assert_eq!(
        picture.await,
        Ok(Picture::FileUri("file:///photo.jpg".into()))
    );
}

#[tokio::test]
async fn take_picture_reports_native_error() {
    let client = CameraClient::new(MemoryBridge::new());
    let picture = client.take_picture(CameraOptions::default());

    client.on_error("cancelled");
    assert_eq!(picture.await, Err(CameraError::Capture("cancelled".into())));
}

#[test]
fn take_picture_is_superseded_by_newer_request() {
    let client = CameraClient::new(MemoryBridge::new());
    let first = client.take_picture(CameraOptions::default());
    let second = client.take_picture(CameraOptions::default());

    client.on_success("AAAA");

    assert_eq!(
        futures::executor::block_on(first),
        Err(CameraError::Superseded)
    );
    let picture = futures::executor::block_on(second).unwrap();
    assert_eq!(
        picture.to_data_url().as_deref(),
        Some("data:image/jpeg;base64,AAAA")
    );
}
