pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod transform;

#[cfg(test)]
mod test_fixtures;
