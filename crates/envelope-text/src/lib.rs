//! Custom text wire format for envelope containers.
//!
//! ```text
//! @header={[1,target_id];[2,target_sub_id];[3,source_id];[4,source_sub_id];[5,message_type];[6,version];};@data={[name,type,data];...};
//! ```
//!
//! Header fields are positional. Each data entry is a `[name,type,data]`
//! triple where `type` is the numeric type tag. Nested containers embed their
//! own header and data sections as the entry's data.

pub mod codec;
pub mod escape;
mod parser;

pub use codec::{
    decode_text, encode_text, from_text, is_text_format, to_text, TextConfig, DATA_OPEN,
    HEADER_FIELDS, HEADER_OPEN,
};
pub use escape::{escape, DELIMITERS};
