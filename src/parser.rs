pub mod spareroom_parser;

pub use spareroom_parser::{Parser, SpareRoomParser};
