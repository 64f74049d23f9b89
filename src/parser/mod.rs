pub mod chunk_parser;
pub mod event_parser;
pub mod header_parser;
pub mod meta_parser;
pub mod primitive_parser;
pub mod smf_parser;
