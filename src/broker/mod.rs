pub mod engine;

pub use engine::Broker;

#[cfg(test)]
mod tests;
