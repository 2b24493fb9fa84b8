pub mod concat_string;
pub mod indexmap;
pub mod url;
