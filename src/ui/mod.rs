pub mod panels;
pub mod tables;
pub mod treemap;
