pub mod charseq;
pub mod cursor;
pub mod document;
pub mod input;
pub mod row;
pub mod terminal;
pub mod viewport;
