pub mod indexing_service;
