pub mod db_utils;
pub mod directory_cache;
