// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for network::protocol and network::message

mod common;

use common::fixtures::{identity, inbound};
use parlor_core::conversation::{InquiryDetails, MessageKind};
use parlor_core::network::*;
use serde_json::{json, Value};

fn to_json(frame: &RelayFrame) -> Value {
    serde_json::from_str(&encode_frame(frame).unwrap()).unwrap()
}

#[test]
fn test_frame_envelope_shape() {
    let frame = create_frame(RelayEvent::ReadReceipt(ReadReceipt {
        to_chat_id: "c1".into(),
    }));
    let value = to_json(&frame);

    assert_eq!(value["version"], json!(PROTOCOL_VERSION));
    assert_eq!(value["frameId"], json!(frame.frame_id));
    assert_eq!(value["payload"]["event"], json!("read_receipt"));
    assert_eq!(value["payload"]["data"]["toCId"], json!("c1"));
}

#[test]
fn test_frame_ids_are_unique() {
    let a = create_frame(RelayEvent::Disconnect);
    let b = create_frame(RelayEvent::Disconnect);
    assert_ne!(a.frame_id, b.frame_id);
}

#[test]
fn test_authenticate_uses_chat_id_as_session_id() {
    let frame = create_frame(RelayEvent::Authenticate((&identity()).into()));
    let data = &to_json(&frame)["payload"]["data"];

    assert_eq!(data["sessionID"], json!("chat-me"));
    assert_eq!(data["userName"], json!("Me"));
    assert_eq!(data["userEmail"], json!("me@example.com"));
    assert_eq!(data["userChatId"], json!("chat-me"));
}

#[test]
fn test_chat_message_wire_names() {
    let mut msg = inbound("A", "c1", "hi", 1_000);
    msg.display_time_sent = "1/1/1970, 12:00 AM".into();
    let frame = create_frame(RelayEvent::NewMessages(msg));
    let data = &to_json(&frame)["payload"]["data"];

    assert_eq!(data["content"], json!("hi"));
    assert_eq!(data["fromId"], json!("A"));
    assert_eq!(data["fromUserName"], json!("A"));
    assert_eq!(data["to"], json!("chat-me"));
    assert_eq!(data["toUserName"], json!("Me"));
    assert_eq!(data["toCId"], json!("c1"));
    assert_eq!(data["utcTimeSent"], json!(1_000));
    assert_eq!(data["timeSent"], json!("1/1/1970, 12:00 AM"));
    assert!(data.get("type").is_none());
    assert!(data.get("pid").is_none());
}

#[test]
fn test_inquiry_message_wire_names() {
    let mut msg = inbound("chat-me", "c9", "Is this in stock?", 5);
    msg.kind = MessageKind::Inquiry(InquiryDetails {
        product_id: "p1".into(),
        product_name: "Lamp".into(),
        thumbnail: "https://img.example.com/lamp.png".into(),
        quantity: 2,
        store_name: Some("Shop".into()),
    });
    let frame = create_frame(RelayEvent::PrivateMessage(msg.clone()));
    let value = to_json(&frame);
    let data = &value["payload"]["data"];

    assert_eq!(value["payload"]["event"], json!("private_message"));
    assert_eq!(data["type"], json!("inq"));
    assert_eq!(data["pid"], json!("p1"));
    assert_eq!(data["productName"], json!("Lamp"));
    assert_eq!(data["qty"], json!(2));
    assert_eq!(data["storeName"], json!("Shop"));

    let decoded = decode_frame(&encode_frame(&frame).unwrap()).unwrap();
    assert_eq!(decoded.payload, RelayEvent::PrivateMessage(msg));
}

#[test]
fn test_decode_relay_message_with_defaults() {
    let text = json!({
        "version": 1,
        "frameId": "f-1",
        "timestamp": 0,
        "payload": {
            "event": "new_messages",
            "data": {"fromId": "A", "content": "hi", "type": "inq", "pid": "p1"}
        }
    })
    .to_string();

    let frame = decode_frame(&text).unwrap();
    let RelayEvent::NewMessages(msg) = frame.payload else {
        panic!("expected new_messages");
    };
    assert_eq!(msg.from_id, "A");
    assert_eq!(msg.utc_time_sent, 0);
    let details = msg.inquiry().unwrap();
    assert_eq!(details.product_id, "p1");
    assert_eq!(details.quantity, 1);
}

#[test]
fn test_decode_unit_and_unknown_events() {
    let disconnect = json!({
        "version": 1, "frameId": "f-1", "timestamp": 0,
        "payload": {"event": "disconnect"}
    })
    .to_string();
    assert_eq!(
        decode_frame(&disconnect).unwrap().payload,
        RelayEvent::Disconnect
    );

    let unknown = json!({
        "version": 1, "frameId": "f-2", "timestamp": 0,
        "payload": {"event": "typing_indicator"}
    })
    .to_string();
    assert_eq!(decode_frame(&unknown).unwrap().payload, RelayEvent::Unknown);
}

#[test]
fn test_decode_roster_keeps_raw_entries() {
    let text = json!({
        "version": 1, "frameId": "f-1", "timestamp": 0,
        "payload": {
            "event": "roster_update",
            "data": {"users": [{"userID": "A", "chatId": "c1"}, {"userID": 7}]}
        }
    })
    .to_string();

    let RelayEvent::RosterUpdate(snapshot) = decode_frame(&text).unwrap().payload else {
        panic!("expected roster_update");
    };
    assert_eq!(snapshot.users.len(), 2);
}

#[test]
fn test_decode_rejects_other_version() {
    let mut frame = create_frame(RelayEvent::Disconnect);
    frame.version = PROTOCOL_VERSION + 1;
    let text = serde_json::to_string(&frame).unwrap();

    assert!(matches!(
        decode_frame(&text),
        Err(NetworkError::InvalidMessage(_))
    ));
}

#[test]
fn test_decode_rejects_garbage() {
    assert!(matches!(
        decode_frame("not json"),
        Err(NetworkError::InvalidMessage(_))
    ));
}

#[test]
fn test_oversized_frames_rejected() {
    let big = "x".repeat(MAX_FRAME_SIZE + 1);
    assert!(matches!(
        decode_frame(&big),
        Err(NetworkError::FrameTooLarge { .. })
    ));

    let frame = create_frame(RelayEvent::NewMessages(inbound("A", "c1", &big, 1)));
    assert!(matches!(
        encode_frame(&frame),
        Err(NetworkError::FrameTooLarge { .. })
    ));
}

#[test]
fn test_create_ack_references_frame() {
    let ack = create_ack("f-42");
    assert_eq!(
        ack.payload,
        RelayEvent::Ack(Acknowledgment {
            ack_for: "f-42".into()
        })
    );
    assert_eq!(to_json(&ack)["payload"]["data"]["ackFor"], json!("f-42"));
}
