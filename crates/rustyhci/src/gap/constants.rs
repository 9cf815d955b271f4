// HCI LE address types (as carried in HCI command parameters)
pub const PUBLIC_DEVICE_ADDRESS: u8 = 0x00;
pub const RANDOM_DEVICE_ADDRESS: u8 = 0x01;
pub const PUBLIC_IDENTITY_ADDRESS: u8 = 0x02;
pub const RANDOM_IDENTITY_ADDRESS: u8 = 0x03;

// Management protocol address types
pub const BDADDR_BREDR: u8 = 0x00;
pub const BDADDR_LE_PUBLIC: u8 = 0x01;
pub const BDADDR_LE_RANDOM: u8 = 0x02;

// IO capabilities
pub const IO_CAP_DISPLAY_ONLY: u8 = 0x00;
pub const IO_CAP_DISPLAY_YES_NO: u8 = 0x01;
pub const IO_CAP_KEYBOARD_ONLY: u8 = 0x02;
pub const IO_CAP_NO_INPUT_NO_OUTPUT: u8 = 0x03;
pub const IO_CAP_KEYBOARD_DISPLAY: u8 = 0x04;

// Advertising / EIR Data Types
pub const ADV_TYPE_FLAGS: u8 = 0x01;
pub const ADV_TYPE_16BIT_SERVICE_UUID_PARTIAL: u8 = 0x02;
pub const ADV_TYPE_16BIT_SERVICE_UUID_COMPLETE: u8 = 0x03;
pub const ADV_TYPE_SHORT_LOCAL_NAME: u8 = 0x08;
pub const ADV_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
pub const ADV_TYPE_TX_POWER_LEVEL: u8 = 0x0A;
pub const ADV_TYPE_CLASS_OF_DEVICE: u8 = 0x0D;
pub const ADV_TYPE_APPEARANCE: u8 = 0x19;
pub const ADV_TYPE_MANUFACTURER_SPECIFIC: u8 = 0xFF;

// General / limited inquiry access codes
pub const GIAC_LAP: u32 = 0x9E8B33;
pub const LIAC_LAP: u32 = 0x9E8B00;
