pub mod api;
pub mod config;
pub mod proxy;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
