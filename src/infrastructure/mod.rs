pub mod dynamodb;
pub mod s3_adapter;
