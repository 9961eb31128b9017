//! BGAPI Bluetooth Smart message declarations.
//!
//! Classes: 0 system, 1 persistent store, 2 attribute database,
//! 3 connection, 4 attribute client, 5 security manager, 6 GAP,
//! 7 hardware. A command and its response share a (class, method) key;
//! events have their own numbering within each class.

use crate::error::ResponseCode;
use crate::types::{
    AddressType, AttributeChangeReason, AttributeValueType, BdAddr, GapConnectableMode,
    GapDiscoverMode, GapDiscoverableMode, ScanResponseType, SmpIoCapabilities,
};

define_messages! {
    /// Host to device commands.
    pub enum Command: Command {
        // System (0x00)
        /// Reset the local device, optionally into DFU mode.
        SystemReset = (0x00, 0x00) { boot_in_dfu: u8 },
        /// Check that the device is alive.
        SystemHello = (0x00, 0x01) {},
        /// Read the local Bluetooth address.
        SystemAddressGet = (0x00, 0x02) {},
        /// Read and reset packet counters.
        SystemGetCounters = (0x00, 0x05) {},
        /// Read the number of supported connections.
        SystemGetConnections = (0x00, 0x06) {},
        /// Read software and hardware versions.
        SystemGetInfo = (0x00, 0x08) {},

        // Persistent store (0x01)
        FlashPsDefrag = (0x01, 0x00) {},
        FlashPsEraseAll = (0x01, 0x02) {},
        /// Store a value under a persistent store key.
        FlashPsSave = (0x01, 0x03) { key: u16, value: Vec<u8> },
        FlashPsLoad = (0x01, 0x04) { key: u16 },
        FlashPsErase = (0x01, 0x05) { key: u16 },

        // Attribute database (0x02)
        /// Write a local attribute value.
        AttributesWrite = (0x02, 0x00) { handle: u16, offset: u8, value: Vec<u8> },
        AttributesRead = (0x02, 0x01) { handle: u16, offset: u16 },

        // Connection (0x03)
        ConnectionDisconnect = (0x03, 0x00) { connection: u8 },
        ConnectionGetRssi = (0x03, 0x01) { connection: u8 },
        /// Ask for a connection status event.
        ConnectionGetStatus = (0x03, 0x07) { connection: u8 },

        // Attribute client (0x04)
        AttclientFindByTypeValue = (0x04, 0x00) {
            connection: u8,
            start: u16,
            end: u16,
            uuid: u16,
            value: Vec<u8>,
        },
        /// Discover primary services (group type 0x2800).
        AttclientReadByGroupType = (0x04, 0x01) {
            connection: u8,
            start: u16,
            end: u16,
            uuid: Vec<u8>,
        },
        AttclientReadByType = (0x04, 0x02) {
            connection: u8,
            start: u16,
            end: u16,
            uuid: Vec<u8>,
        },
        /// Discover attribute handles and their types.
        AttclientFindInformation = (0x04, 0x03) { connection: u8, start: u16, end: u16 },
        AttclientReadByHandle = (0x04, 0x04) { connection: u8, chr_handle: u16 },
        /// Write with response.
        AttclientAttributeWrite = (0x04, 0x05) { connection: u8, att_handle: u16, data: Vec<u8> },
        /// Write without response.
        AttclientWriteCommand = (0x04, 0x06) { connection: u8, att_handle: u16, data: Vec<u8> },

        // Security manager (0x05)
        SmEncryptStart = (0x05, 0x00) { handle: u8, bonding: u8 },
        SmSetBondableMode = (0x05, 0x01) { bondable: u8 },
        /// Delete a bonding; 0xFF deletes all.
        SmDeleteBonding = (0x05, 0x02) { handle: u8 },
        SmSetParameters = (0x05, 0x03) {
            mitm: u8,
            min_key_size: u8,
            io_capabilities: SmpIoCapabilities,
        },
        SmPasskeyEntry = (0x05, 0x04) { handle: u8, passkey: u32 },
        SmGetBonds = (0x05, 0x05) {},
        /// Add all bonded devices with a known public or static address to
        /// the white list, clearing previous entries. Not allowed while
        /// advertising, scanning or connected.
        SmWhitelistBonds = (0x05, 0x07) {},

        // GAP (0x06)
        GapSetPrivacyFlags = (0x06, 0x00) { peripheral_privacy: u8, central_privacy: u8 },
        GapSetMode = (0x06, 0x01) { discover: GapDiscoverableMode, connect: GapConnectableMode },
        /// Start the GAP discovery procedure.
        GapDiscover = (0x06, 0x02) { mode: GapDiscoverMode },
        GapConnectDirect = (0x06, 0x03) {
            address: BdAddr,
            addr_type: AddressType,
            conn_interval_min: u16,
            conn_interval_max: u16,
            timeout: u16,
            latency: u16,
        },
        /// End the current GAP procedure.
        GapEndProcedure = (0x06, 0x04) {},
        GapSetScanParameters = (0x06, 0x07) { scan_interval: u16, scan_window: u16, active: u8 },

        // Hardware (0x07)
        /// Set TX power as an index into the radio power table.
        HardwareSetTxpower = (0x07, 0x0C) { power: u8 },
    }
}

define_messages! {
    /// Device replies to commands.
    pub enum Response: Response {
        // System (0x00)
        SystemHello = (0x00, 0x01) {},
        SystemAddressGet = (0x00, 0x02) { address: BdAddr },
        SystemGetCounters = (0x00, 0x05) {
            tx_ok: u8,
            tx_retry: u8,
            rx_ok: u8,
            rx_fail: u8,
            mbuf: u8,
        },
        SystemGetConnections = (0x00, 0x06) { max_connections: u8 },
        SystemGetInfo = (0x00, 0x08) {
            major: u16,
            minor: u16,
            patch: u16,
            build: u16,
            ll_version: u16,
            protocol_version: u8,
            hw: u8,
        },

        // Persistent store (0x01)
        FlashPsDefrag = (0x01, 0x00) {},
        FlashPsEraseAll = (0x01, 0x02) {},
        FlashPsSave = (0x01, 0x03) { result: ResponseCode },
        FlashPsLoad = (0x01, 0x04) { result: ResponseCode, value: Vec<u8> },
        FlashPsErase = (0x01, 0x05) {},

        // Attribute database (0x02)
        AttributesWrite = (0x02, 0x00) { result: ResponseCode },
        AttributesRead = (0x02, 0x01) {
            handle: u16,
            offset: u16,
            result: ResponseCode,
            value: Vec<u8>,
        },

        // Connection (0x03)
        ConnectionDisconnect = (0x03, 0x00) { connection: u8, result: ResponseCode },
        /// RSSI of the connection in dBm.
        ConnectionGetRssi = (0x03, 0x01) { connection: u8, rssi: i8 },
        ConnectionGetStatus = (0x03, 0x07) { connection: u8 },

        // Attribute client (0x04)
        AttclientFindByTypeValue = (0x04, 0x00) { connection: u8, result: ResponseCode },
        AttclientReadByGroupType = (0x04, 0x01) { connection: u8, result: ResponseCode },
        AttclientReadByType = (0x04, 0x02) { connection: u8, result: ResponseCode },
        AttclientFindInformation = (0x04, 0x03) { connection: u8, result: ResponseCode },
        AttclientReadByHandle = (0x04, 0x04) { connection: u8, result: ResponseCode },
        AttclientAttributeWrite = (0x04, 0x05) { connection: u8, result: ResponseCode },
        AttclientWriteCommand = (0x04, 0x06) { connection: u8, result: ResponseCode },

        // Security manager (0x05)
        SmEncryptStart = (0x05, 0x00) { handle: u8, result: ResponseCode },
        SmSetBondableMode = (0x05, 0x01) {},
        SmDeleteBonding = (0x05, 0x02) { result: ResponseCode },
        SmSetParameters = (0x05, 0x03) {},
        SmPasskeyEntry = (0x05, 0x04) { result: ResponseCode },
        SmGetBonds = (0x05, 0x05) { bonds: u8 },
        /// Result of the white list update and the number of whitelisted
        /// bonds.
        SmWhitelistBonds = (0x05, 0x07) { result: ResponseCode, count: u8 },

        // GAP (0x06)
        GapSetPrivacyFlags = (0x06, 0x00) {},
        GapSetMode = (0x06, 0x01) { result: ResponseCode },
        GapDiscover = (0x06, 0x02) { result: ResponseCode },
        GapConnectDirect = (0x06, 0x03) { result: ResponseCode, connection_handle: u8 },
        GapEndProcedure = (0x06, 0x04) { result: ResponseCode },
        GapSetScanParameters = (0x06, 0x07) { result: ResponseCode },

        // Hardware (0x07)
        HardwareSetTxpower = (0x07, 0x0C) {},
    }
}

define_messages! {
    /// Unsolicited device notifications.
    pub enum Event: Event {
        // System (0x00)
        /// Device started, reporting its firmware version.
        SystemBoot = (0x00, 0x00) {
            major: u16,
            minor: u16,
            patch: u16,
            build: u16,
            ll_version: u16,
            protocol_version: u8,
            hw: u8,
        },
        /// The device could not parse a command. `reason` is a 16-bit BGAPI
        /// error code.
        SystemProtocolError = (0x00, 0x06) { reason: u16 },

        // Attribute database (0x02)
        /// A remote device changed a local attribute.
        AttributesValue = (0x02, 0x00) {
            connection: u8,
            reason: AttributeChangeReason,
            handle: u16,
            offset: u16,
            value: Vec<u8>,
        },
        AttributesStatus = (0x02, 0x02) { handle: u16, flags: u8 },

        // Connection (0x03)
        ConnectionStatus = (0x03, 0x00) {
            connection: u8,
            flags: u8,
            address: BdAddr,
            address_type: AddressType,
            conn_interval: u16,
            timeout: u16,
            latency: u16,
            bonding: u8,
        },
        /// Connection closed. `reason` is a 16-bit BGAPI error code.
        ConnectionDisconnected = (0x03, 0x04) { connection: u8, reason: u16 },

        // Attribute client (0x04)
        AttclientProcedureCompleted = (0x04, 0x01) {
            connection: u8,
            result: ResponseCode,
            chr_handle: u16,
        },
        AttclientGroupFound = (0x04, 0x02) {
            connection: u8,
            start: u16,
            end: u16,
            uuid: Vec<u8>,
        },
        AttclientFindInformationFound = (0x04, 0x04) {
            connection: u8,
            chr_handle: u16,
            uuid: Vec<u8>,
        },
        AttclientAttributeValue = (0x04, 0x05) {
            connection: u8,
            att_handle: u16,
            value_type: AttributeValueType,
            value: Vec<u8>,
        },

        // Security manager (0x05)
        SmBondingFail = (0x05, 0x01) { handle: u8, result: ResponseCode },
        SmPasskeyDisplay = (0x05, 0x02) { handle: u8, passkey: u32 },
        SmPasskeyRequest = (0x05, 0x03) { handle: u8 },
        SmBondStatus = (0x05, 0x04) { bond: u8, keysize: u8, mitm: u8, keys: u8 },

        // GAP (0x06)
        /// Advertisement or scan response seen during discovery.
        GapScanResponse = (0x06, 0x00) {
            rssi: i8,
            packet_type: ScanResponseType,
            sender: BdAddr,
            address_type: AddressType,
            bond: u8,
            data: Vec<u8>,
        },
    }
}
