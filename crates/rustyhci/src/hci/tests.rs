//! Unit tests for HCI packet parsing and command exchanges

use super::command::*;
use super::constants::*;
use super::packet::*;
use super::params::*;
use crate::error::HciError;
use crate::gap::Address;

fn event_frame(event_code: u8, parameters: &[u8]) -> Vec<u8> {
    let mut frame = vec![HCI_EVENT_PKT, event_code, parameters.len() as u8];
    frame.extend_from_slice(parameters);
    frame
}

fn command_complete(opcode: u16, return_parameters: &[u8]) -> Vec<u8> {
    let mut parameters = vec![1];
    parameters.extend_from_slice(&opcode.to_le_bytes());
    parameters.extend_from_slice(return_parameters);
    event_frame(EVT_CMD_COMPLETE, &parameters)
}

fn command_status(opcode: u16, status: u8) -> Vec<u8> {
    let mut parameters = vec![status, 1];
    parameters.extend_from_slice(&opcode.to_le_bytes());
    event_frame(EVT_CMD_STATUS, &parameters)
}

#[test]
fn test_opcode_packing() {
    assert_eq!(opcode(OGF_LE, OCF_LE_SET_SCAN_PARAMETERS), 0x200B);
    assert_eq!(opcode(OGF_LINK_CTL, OCF_DISCONNECT), 0x0406);
    assert_eq!(ogf(0x200B), OGF_LE);
    assert_eq!(ocf(0x200B), OCF_LE_SET_SCAN_PARAMETERS);
    assert_eq!(REMOTE_NAME.opcode, 0x0419);
}

#[test]
fn test_command_serialization() {
    let mut exchange = CommandExchange::with_parameters(&LeSetScanParameters {
        scan_type: 0x01,
        interval: 0x0010,
        window: 0x0012,
        own_address_type: 0x00,
        filter_policy: 0x00,
    })
    .unwrap();

    let packet = exchange.packet().to_vec();
    assert_eq!(packet.len(), 4 + 7);
    assert_eq!(packet[0], HCI_COMMAND_PKT);

    // Opcode: LE Set Scan Parameters
    assert_eq!(u16::from_le_bytes([packet[1], packet[2]]), 0x200B);
    assert_eq!(packet[3], 7);

    assert_eq!(packet[4], 0x01); // scan_type
    assert_eq!(u16::from_le_bytes([packet[5], packet[6]]), 0x0010); // interval
    assert_eq!(u16::from_le_bytes([packet[7], packet[8]]), 0x0012); // window
    assert_eq!(packet[9], 0x00); // own_address_type
    assert_eq!(packet[10], 0x00); // filter_policy

    let mut out = [0u8; 64];
    assert_eq!(exchange.serialize(&mut out), packet.len());
    assert_eq!(&out[..packet.len()], &packet[..]);
    assert_eq!(exchange.serialize(&mut out), 0);
}

#[test]
fn test_disconnect_serialization() {
    let exchange = CommandExchange::with_parameters(&Disconnect {
        handle: 0x0040,
        reason: 0x13,
    })
    .unwrap();

    assert_eq!(exchange.packet(), &[HCI_COMMAND_PKT, 0x06, 0x04, 3, 0x40, 0x00, 0x13]);
}

#[test]
fn test_partial_serialization_and_reload() {
    let mut exchange = CommandExchange::with_parameters(&LeCreateConnection {
        scan_interval: 0x0060,
        scan_window: 0x0030,
        initiator_filter: 0,
        peer_address_type: 0,
        peer_address: Address::new([1, 2, 3, 4, 5, 6]),
        own_address_type: 0,
        min_interval: 0x0006,
        max_interval: 0x000C,
        latency: 0,
        supervision_timeout: 0x00C8,
        min_ce_length: 0,
        max_ce_length: 0,
    })
    .unwrap();

    let mut written = Vec::new();
    let mut chunk = [0u8; 8];
    loop {
        let count = exchange.serialize(&mut chunk);
        if count == 0 {
            break;
        }
        written.extend_from_slice(&chunk[..count]);
    }

    assert_eq!(written.len(), 4 + 25);
    assert_eq!(written, exchange.packet());
    assert_eq!(&written[10..16], &[1, 2, 3, 4, 5, 6]);

    exchange.reload();
    let mut again = [0u8; 64];
    assert_eq!(exchange.serialize(&mut again), written.len());
}

#[test]
fn test_set_payload_checks_length() {
    let mut exchange = CommandExchange::new(&SCAN_ENABLE_LE);
    assert!(exchange.set_payload(&[1]).is_err());
    exchange.set_payload(&[1, 1]).unwrap();
    assert_eq!(exchange.payload(), &[1, 1]);

    exchange.clear();
    assert_eq!(exchange.payload(), &[0, 0]);
}

#[test]
fn test_hci_event_parsing() {
    // Command Complete for Reset
    let data = [
        EVT_CMD_COMPLETE, // Event code
        4,                // Parameter length
        1,                // Num_HCI_Command_Packets
        0x03,             // Command_Opcode (low byte)
        0x0C,             // Command_Opcode (high byte)
        0x00,             // Status
    ];

    let event = HciEvent::parse(&data).unwrap();

    assert_eq!(event.event_code, EVT_CMD_COMPLETE);
    assert_eq!(event.parameter_total_length, 4);
    assert_eq!(event.parameters, vec![1, 0x03, 0x0C, 0x00]);
    assert_eq!(event.command_opcode(), Some(0x0C03));
    assert_eq!(event.status(), Some(0x00));
    assert_eq!(event.subevent(), None);

    let event = HciEvent::parse(&[EVT_LE_META_EVENT, 2, EVT_LE_ADVERTISING_REPORT, 0]).unwrap();
    assert_eq!(event.subevent(), Some(EVT_LE_ADVERTISING_REPORT));
    assert_eq!(
        event.header(),
        EventHeader {
            event_code: EVT_LE_META_EVENT,
            parameter_length: 2
        }
    );

    // Invalid data tests
    assert!(HciEvent::parse(&[]).is_none());
    assert!(HciEvent::parse(&[EVT_CMD_COMPLETE, 10, 1, 2]).is_none());
}

#[test]
fn test_command_complete_with_other_opcode_stays_pending() {
    let mut exchange = CommandExchange::new(&SCAN_ENABLE_LE);
    let frame = command_complete(SCAN_PARAMETERS_LE.opcode, &[0x00]);

    assert_eq!(exchange.deserialize(&frame), 0);
    assert!(!exchange.is_completed());
    assert_eq!(exchange.outcome(), None);
}

#[test]
fn test_command_complete_copies_only_inbound_size() {
    let mut exchange = CommandExchange::new(&READ_WHITE_LIST_SIZE);
    let frame = command_complete(READ_WHITE_LIST_SIZE.opcode, &[0x00, 0x08, 0xAA, 0xBB, 0xCC]);

    assert_eq!(exchange.deserialize(&frame), frame.len());
    assert!(exchange.is_completed());
    assert_eq!(exchange.outcome(), Some(Outcome::Success));
    assert_eq!(exchange.response(), &[0x00, 0x08]);

    let size = WhiteListSize::parse(exchange.response()).unwrap();
    assert_eq!(size, WhiteListSize { status: 0, size: 8 });
}

#[test]
fn test_command_complete_without_return_parameters_is_malformed() {
    let mut exchange = CommandExchange::new(&SCAN_ENABLE_LE);
    let frame = command_complete(SCAN_ENABLE_LE.opcode, &[]);

    assert_eq!(exchange.deserialize(&frame), frame.len());
    assert_eq!(exchange.outcome(), Some(Outcome::Malformed));
    assert!(!exchange.succeeded());
}

#[test]
fn test_command_complete_reports_return_status() {
    let mut exchange = CommandExchange::new(&SCAN_ENABLE_LE);
    assert_eq!(exchange.return_status(), None);

    exchange.deserialize(&command_complete(SCAN_ENABLE_LE.opcode, &[0x0C]));
    assert!(exchange.succeeded());
    assert_eq!(exchange.return_status(), Some(0x0C));

    exchange.reload();
    assert!(!exchange.is_completed());
    assert_eq!(exchange.response(), &[0x00]);
}

#[test]
fn test_command_status_for_status_only_command() {
    let mut exchange = CommandExchange::new(&CLEAR_WHITE_LIST);
    exchange.deserialize(&command_status(CLEAR_WHITE_LIST.opcode, 0x00));
    assert_eq!(exchange.outcome(), Some(Outcome::Success));

    let mut exchange = CommandExchange::new(&CLEAR_WHITE_LIST);
    exchange.deserialize(&command_status(CLEAR_WHITE_LIST.opcode, 0x0C));
    assert_eq!(exchange.outcome(), Some(Outcome::Status(0x0C)));
}

fn le_create_connection(peer: Address) -> LeCreateConnection {
    LeCreateConnection {
        scan_interval: 0x0060,
        scan_window: 0x0030,
        initiator_filter: 0,
        peer_address_type: 0,
        peer_address: peer,
        own_address_type: 0,
        min_interval: 0x0006,
        max_interval: 0x000C,
        latency: 0,
        supervision_timeout: 0x00C8,
        min_ce_length: 0,
        max_ce_length: 0,
    }
}

fn le_connection_complete(peer: [u8; 6]) -> Vec<u8> {
    let mut parameters = vec![
        EVT_LE_CONN_COMPLETE,
        0x00, // Status
        0x40,
        0x00, // Connection_Handle
        0x00, // Role
        0x00, // Peer_Address_Type
    ];
    parameters.extend_from_slice(&peer);
    parameters.extend_from_slice(&[
        0x0A, 0x00, // Conn_Interval
        0x00, 0x00, // Conn_Latency
        0x80, 0x0C, // Supervision_Timeout
        0x00, // Clock_Accuracy
    ]);
    event_frame(EVT_LE_META_EVENT, &parameters)
}

#[test]
fn test_command_status_success_completes_exchange() {
    let mut exchange = CommandExchange::new(&CONNECT_LE);

    let status = command_status(CONNECT_LE.opcode, 0x00);
    assert_eq!(exchange.deserialize(&status), status.len());
    assert_eq!(exchange.outcome(), Some(Outcome::Success));
    assert_eq!(exchange.response(), &[0u8; 18][..]);

    let mut exchange = CommandExchange::new(&REMOTE_NAME);
    exchange.deserialize(&command_status(REMOTE_NAME.opcode, 0x00));
    assert!(exchange.succeeded());
}

#[test]
fn test_le_connect_completes_on_meta_event() {
    let peer = Address::new([1, 2, 3, 4, 5, 6]);
    let mut exchange = CommandExchange::with_parameters(&le_create_connection(peer)).unwrap();

    // Inquiry Complete shares its code with the LE sub-event
    assert_eq!(exchange.deserialize(&event_frame(EVT_INQUIRY_COMPLETE, &[0x00])), 0);
    assert!(!exchange.is_completed());

    // Wrong sub-event
    let wrong = event_frame(EVT_LE_META_EVENT, &[EVT_LE_CONN_UPDATE_COMPLETE, 0x00]);
    assert_eq!(exchange.deserialize(&wrong), 0);
    assert!(!exchange.is_completed());

    // Another peer connecting
    let other = le_connection_complete([9, 9, 9, 9, 9, 9]);
    assert_eq!(exchange.deserialize(&other), 0);
    assert!(!exchange.is_completed());

    let frame = le_connection_complete([1, 2, 3, 4, 5, 6]);
    assert_eq!(exchange.deserialize(&frame), frame.len());
    assert!(exchange.succeeded());

    let complete = LeConnectionComplete::parse(exchange.response()).unwrap();
    assert_eq!(complete.handle, 0x0040);
    assert_eq!(complete.peer_address, peer);
    assert_eq!(complete.interval, 0x000A);
    assert_eq!(complete.supervision_timeout, 0x0C80);
}

#[test]
fn test_le_connect_from_white_list_takes_any_peer() {
    let mut parameters = le_create_connection(Address::any());
    parameters.initiator_filter = 0x01;
    let mut exchange = CommandExchange::with_parameters(&parameters).unwrap();

    exchange.deserialize(&le_connection_complete([9, 8, 7, 6, 5, 4]));
    assert!(exchange.succeeded());
}

#[test]
fn test_le_connect_rejected_by_status() {
    let mut exchange = CommandExchange::new(&CONNECT_LE);
    exchange.deserialize(&command_status(CONNECT_LE.opcode, 0x0C));
    assert_eq!(exchange.outcome(), Some(Outcome::Status(0x0C)));
}

#[test]
fn test_invalid_address_is_not_encoded() {
    let result = CommandExchange::with_parameters(&le_create_connection(Address::invalid()));
    assert!(matches!(result, Err(HciError::InvalidAddress(_))));

    let result = CommandExchange::with_parameters(&RemoteNameRequest {
        address: Address::invalid(),
        page_scan_repetition_mode: 0x01,
        clock_offset: 0,
    });
    assert!(matches!(result, Err(HciError::InvalidAddress(_))));
}

#[test]
fn test_meta_event_ignored_for_classic_command() {
    let mut exchange = CommandExchange::new(&DISCONNECT);
    let frame = event_frame(EVT_LE_META_EVENT, &[EVT_DISCONN_COMPLETE, 0x00]);
    assert_eq!(exchange.deserialize(&frame), 0);
    assert!(!exchange.is_completed());
}

#[test]
fn test_disconnect_completes_on_its_own_link() {
    let mut exchange = CommandExchange::with_parameters(&Disconnect {
        handle: 0x0040,
        reason: 0x13,
    })
    .unwrap();

    // Some other link going down
    let other = event_frame(EVT_DISCONN_COMPLETE, &[0x00, 0x41, 0x00, 0x08]);
    assert_eq!(exchange.deserialize(&other), 0);
    assert!(!exchange.is_completed());

    // Handle flags in the top nibble are not part of the handle
    exchange.deserialize(&event_frame(EVT_DISCONN_COMPLETE, &[0x00, 0x40, 0x20, 0x16]));
    assert!(exchange.succeeded());

    let complete = DisconnectionComplete::parse(exchange.response()).unwrap();
    assert_eq!(complete.status, 0);
    assert_eq!(complete.reason, 0x16);
}

#[test]
fn test_remote_name_completion() {
    let mut exchange = CommandExchange::with_parameters(&RemoteNameRequest {
        address: "01:02:03:04:05:06".parse().unwrap(),
        page_scan_repetition_mode: 0x01,
        clock_offset: 0,
    })
    .unwrap();

    let mut stranger = vec![0x00, 1, 1, 1, 1, 1, 1];
    stranger.extend_from_slice(b"Phone\0");
    assert_eq!(
        exchange.deserialize(&event_frame(EVT_REMOTE_NAME_REQ_COMPLETE, &stranger)),
        0
    );

    let mut parameters = vec![0x00, 6, 5, 4, 3, 2, 1];
    parameters.extend_from_slice(b"Speaker\0junk");

    exchange.deserialize(&event_frame(EVT_REMOTE_NAME_REQ_COMPLETE, &parameters));
    assert!(exchange.succeeded());

    let complete = RemoteNameComplete::parse(exchange.response()).unwrap();
    assert_eq!(complete.name, "Speaker");
    assert_eq!(complete.address.to_string(), "01:02:03:04:05:06");
}

#[test]
fn test_remote_features_completion() {
    let mut exchange =
        CommandExchange::with_parameters(&LeReadRemoteFeatures { handle: 0x0041 }).unwrap();

    let frame = event_frame(
        EVT_LE_META_EVENT,
        &[
            EVT_LE_READ_REMOTE_USED_FEATURES_COMPLETE,
            0x00,
            0x41,
            0x00,
            0x01,
            0x01,
            0,
            0,
            0,
            0,
            0,
            0,
        ],
    );
    exchange.deserialize(&frame);
    assert!(exchange.succeeded());

    let remote = RemoteFeatures::parse(exchange.response()).unwrap();
    assert_eq!(remote.handle, 0x0041);
    assert_eq!(remote.features.collect::<Vec<_>>(), vec![0, 8]);
}

#[test]
fn test_short_frames_are_not_consumed() {
    let mut exchange = CommandExchange::new(&SCAN_ENABLE_LE);

    assert_eq!(exchange.deserialize(&[]), 0);
    assert_eq!(exchange.deserialize(&[HCI_EVENT_PKT]), 0);
    assert_eq!(exchange.deserialize(&[HCI_EVENT_PKT, EVT_CMD_COMPLETE]), 0);
    // Opcode cut short
    assert_eq!(exchange.deserialize(&[HCI_EVENT_PKT, EVT_CMD_COMPLETE, 2, 1, 0x0C]), 0);
    assert!(!exchange.is_completed());
}

#[test]
fn test_inquiry_parameters() {
    let exchange = CommandExchange::with_parameters(&Inquiry {
        lap: crate::gap::GIAC_LAP,
        length: 8,
        num_responses: 0,
    })
    .unwrap();
    assert_eq!(exchange.payload(), &[0x33, 0x8B, 0x9E, 8, 0]);
}
