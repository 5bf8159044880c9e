pub mod access;
pub mod db_store;
pub mod mailer;
#[cfg(test)]
pub mod memory_store;
pub mod store;
