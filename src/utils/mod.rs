pub mod token_cache;
