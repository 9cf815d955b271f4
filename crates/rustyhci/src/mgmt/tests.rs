//! Unit tests for management exchanges

use super::constants::*;
use super::exchange::ManagementExchange;
use crate::error::HciError;
use crate::gap::{Address, AddressType, IoCapability};

fn event(code: u16, index: u16, parameters: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&code.to_le_bytes());
    frame.extend_from_slice(&index.to_le_bytes());
    frame.extend_from_slice(&(parameters.len() as u16).to_le_bytes());
    frame.extend_from_slice(parameters);
    frame
}

fn complete(opcode: u16, status: u8, response: &[u8]) -> Vec<u8> {
    let mut parameters = opcode.to_le_bytes().to_vec();
    parameters.push(status);
    parameters.extend_from_slice(response);
    event(MGMT_EV_CMD_COMPLETE, 0, &parameters)
}

#[test]
fn test_header_encoding() {
    let exchange = ManagementExchange::set_powered(1, true);
    assert_eq!(exchange.packet(), &[0x05, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01]);

    let exchange = ManagementExchange::set_discoverable(0, MGMT_DISCOVERABLE_GENERAL, 0x012C);
    assert_eq!(
        exchange.packet(),
        &[0x06, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x2C, 0x01]
    );
}

#[test]
fn test_pair_device_parameters() {
    let address: Address = "00:11:22:33:44:55".parse().unwrap();
    let exchange = ManagementExchange::pair_device(
        0,
        &address,
        AddressType::LePublic,
        IoCapability::KeyboardDisplay,
    )
    .unwrap();

    assert_eq!(exchange.opcode(), MGMT_OP_PAIR_DEVICE);
    assert_eq!(
        &exchange.packet()[6..],
        &[0x55, 0x44, 0x33, 0x22, 0x11, 0x00, 0x01, 0x04]
    );

    let exchange =
        ManagementExchange::unpair_device(0, &address, AddressType::BrEdr, true).unwrap();
    assert_eq!(&exchange.packet()[4..6], &[8, 0]);
    assert_eq!(exchange.packet()[12..], [0x00, 0x01]);
}

#[test]
fn test_invalid_address_is_refused() {
    let invalid = Address::invalid();

    let pair = ManagementExchange::pair_device(
        0,
        &invalid,
        AddressType::BrEdr,
        IoCapability::NoInputNoOutput,
    );
    assert!(matches!(pair, Err(HciError::InvalidAddress(_))));

    let cancel = ManagementExchange::cancel_pair_device(0, &invalid, AddressType::BrEdr);
    assert!(matches!(cancel, Err(HciError::InvalidAddress(_))));

    let unpair = ManagementExchange::unpair_device(0, &invalid, AddressType::LeRandom, false);
    assert!(matches!(unpair, Err(HciError::InvalidAddress(_))));
}

#[test]
fn test_answers_only_its_own_reply() {
    let exchange = ManagementExchange::set_powered(1, true);

    let reply = event(MGMT_EV_CMD_COMPLETE, 1, &[0x05, 0x00, MGMT_STATUS_SUCCESS]);
    assert!(exchange.answers(&reply));
    assert!(exchange.answers(&reply[..3]));

    // Device Connected
    assert!(!exchange.answers(&event(0x000B, 1, &[0; 13])));
    // Another adapter
    assert!(!exchange.answers(&event(MGMT_EV_CMD_COMPLETE, 0, &[0x05, 0x00, 0x00])));
    // Another command
    assert!(!exchange.answers(&event(MGMT_EV_CMD_STATUS, 1, &[0x07, 0x00, 0x00])));
    assert!(!exchange.answers(&[]));
}

#[test]
fn test_answers_rest_of_split_reply() {
    let mut exchange = ManagementExchange::set_powered(0, true);
    let frame = complete(MGMT_OP_SET_POWERED, MGMT_STATUS_SUCCESS, &[0x81, 0, 0, 0]);

    assert!(exchange.answers(&frame[..4]));
    exchange.deserialize(&frame[..4]);
    assert!(exchange.answers(&frame[4..]));
    exchange.deserialize(&frame[4..]);

    assert!(exchange.success());
    assert!(!exchange.answers(&frame));
}

#[test]
fn test_serialize_in_pieces_then_stops() {
    let mut exchange = ManagementExchange::set_low_energy(0, true);
    let mut written = Vec::new();
    let mut chunk = [0u8; 4];

    loop {
        let count = exchange.serialize(&mut chunk);
        if count == 0 {
            break;
        }
        written.extend_from_slice(&chunk[..count]);
    }

    assert_eq!(written, exchange.packet());
    assert_eq!(exchange.serialize(&mut chunk), 0);

    exchange.reload();
    assert_eq!(exchange.serialize(&mut chunk), 4);
}

#[test]
fn test_command_complete_success() {
    let mut exchange = ManagementExchange::set_powered(0, true);
    let frame = complete(MGMT_OP_SET_POWERED, MGMT_STATUS_SUCCESS, &[0x81, 0, 0, 0]);

    assert_eq!(exchange.deserialize(&frame), frame.len());
    assert!(exchange.is_completed());
    assert!(exchange.success());
    assert_eq!(exchange.event(), Some(MGMT_EV_CMD_COMPLETE));
    assert_eq!(exchange.status(), Some(MGMT_STATUS_SUCCESS));
    assert_eq!(exchange.response(), &[0x81, 0, 0, 0]);
}

#[test]
fn test_failure_status_is_a_normal_completion() {
    let mut exchange = ManagementExchange::set_secure_connections(0, true);
    let frame = event(
        MGMT_EV_CMD_STATUS,
        0,
        &[0x2D, 0x00, MGMT_STATUS_NOT_SUPPORTED],
    );

    exchange.deserialize(&frame);
    assert!(exchange.is_completed());
    assert!(!exchange.success());
    assert_eq!(exchange.status(), Some(MGMT_STATUS_NOT_SUPPORTED));
    assert_eq!(exchange.unsupported_event(), None);
}

#[test]
fn test_answer_for_other_opcode_is_not_success() {
    let mut exchange = ManagementExchange::set_bondable(0, true);
    exchange.deserialize(&complete(MGMT_OP_SET_POWERED, MGMT_STATUS_SUCCESS, &[]));

    assert!(exchange.is_completed());
    assert_eq!(exchange.response_opcode(), Some(MGMT_OP_SET_POWERED));
    assert!(!exchange.success());
}

#[test]
fn test_unsupported_event_finishes_after_header() {
    let mut exchange = ManagementExchange::set_powered(0, true);

    // Header only, the announced parameters never arrive
    let header = [0x06, 0x00, 0x00, 0x00, 0x04, 0x00];
    assert_eq!(exchange.deserialize(&header), header.len());

    assert!(exchange.is_completed());
    assert!(!exchange.success());
    assert_eq!(exchange.unsupported_event(), Some(MGMT_EV_NEW_SETTINGS));
    assert_eq!(exchange.status(), None);
    assert_eq!(exchange.deserialize(&[0, 0, 0, 0]), 0);
}

#[test]
fn test_accumulates_split_frames() {
    let mut exchange = ManagementExchange::set_advertising(0, true);
    let frame = complete(MGMT_OP_SET_ADVERTISING, MGMT_STATUS_SUCCESS, &[1, 2, 3, 4]);

    assert_eq!(exchange.deserialize(&frame[..4]), 4);
    assert!(!exchange.is_completed());
    assert_eq!(exchange.event(), None);

    assert_eq!(exchange.deserialize(&frame[4..8]), 4);
    assert!(!exchange.is_completed());
    assert_eq!(exchange.event(), Some(MGMT_EV_CMD_COMPLETE));
    assert_eq!(exchange.response(), &[] as &[u8]);

    assert_eq!(exchange.deserialize(&frame[8..]), frame.len() - 8);
    assert!(exchange.success());
    assert_eq!(exchange.response(), &[1, 2, 3, 4]);
}

#[test]
fn test_surplus_bytes_are_left_alone() {
    let mut exchange = ManagementExchange::set_connectable(0, false);
    let mut frame = complete(MGMT_OP_SET_CONNECTABLE, MGMT_STATUS_SUCCESS, &[]);
    let length = frame.len();
    frame.extend_from_slice(&[0xAA, 0xBB]);

    assert_eq!(exchange.deserialize(&frame), length);
    assert!(exchange.success());
}

#[test]
fn test_truncated_parameters_fail() {
    let mut exchange = ManagementExchange::set_powered(0, false);
    exchange.deserialize(&event(MGMT_EV_CMD_COMPLETE, 0, &[0x05]));

    assert!(exchange.is_completed());
    assert_eq!(exchange.status(), None);
    assert!(!exchange.success());
}

#[test]
fn test_name_tables() {
    assert_eq!(opcode_name(MGMT_OP_SET_POWERED), "Set Powered");
    assert_eq!(opcode_name(MGMT_OP_SET_SECURE_CONN), "Set Secure Connections");
    assert_eq!(opcode_name(0x0100), "<unknown opcode>");
    assert_eq!(status_name(MGMT_STATUS_BUSY), "Busy");
    assert_eq!(status_name(MGMT_STATUS_PERMISSION_DENIED), "Permission Denied");
    assert_eq!(status_name(0x80), "<unknown status>");
}
