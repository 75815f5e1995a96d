pub mod id;
pub mod metadata;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod validate;
