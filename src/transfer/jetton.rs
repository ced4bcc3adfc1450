//! Jetton message codec
//!
//! ```text
//! transfer#0f8a7ea5 query_id:uint64 amount:(VarUInteger 16)
//!   destination:MsgAddress response_destination:MsgAddress
//!   custom_payload:(Maybe ^Cell) forward_ton_amount:(VarUInteger 16)
//!   forward_payload:(Either Cell ^Cell)
//!
//! transfer_notification#7362d09c query_id:uint64 ...
//! ```

use num_bigint::BigUint;
use tonlib_core::TonAddress;
use tonlib_core::cell::{BagOfCells, Cell, CellBuilder, TonCellError};

pub const OP_TRANSFER: u32 = 0x0f8a7ea5;
pub const OP_TRANSFER_NOTIFICATION: u32 = 0x7362d09c;

/// 0.001 TON forwarded with the notification
pub const DEFAULT_FORWARD_AMOUNT: u128 = 1_000_000;

#[derive(Debug, Clone)]
pub struct JettonTransfer {
    pub query_id: u64,
    pub amount: u128,
    pub destination: TonAddress,
    pub response_destination: TonAddress,
    pub forward_ton_amount: u128,
    pub forward_payload: Vec<u8>,
}

pub fn encode(msg: &JettonTransfer) -> Result<Cell, TonCellError> {
    CellBuilder::new()
        .store_u32(32, OP_TRANSFER)?
        .store_u64(64, msg.query_id)?
        .store_coins(&BigUint::from(msg.amount))?
        .store_address(&msg.destination)?
        .store_address(&msg.response_destination)?
        .store_bit(false)? // no custom payload
        .store_coins(&BigUint::from(msg.forward_ton_amount))?
        .store_bit(false)? // forward payload inline
        .store_slice(&msg.forward_payload)?
        .build()
}

/// Query id of a transfer notification; `None` for any other opcode
pub fn decode_notify_prefix(cell: &Cell) -> Result<Option<u64>, TonCellError> {
    let mut parser = cell.parser();
    if parser.remaining_bits() < 32 {
        return Ok(None);
    }
    if parser.load_u32(32)? != OP_TRANSFER_NOTIFICATION {
        return Ok(None);
    }
    Ok(Some(parser.load_u64(64)?))
}

/// Decode a base64 BOC message body and read its notify prefix
pub fn decode_notify_body(body_b64: &str) -> Result<Option<u64>, TonCellError> {
    let root = BagOfCells::parse_base64(body_b64)?.single_root()?;
    decode_notify_prefix(&root)
}
