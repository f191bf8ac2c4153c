//! Registry trait for chain adaptor implementations.
//!
//! Every supported network exposes a `Registry` type that names the network
//! as it appears in the `chains` list of the configuration file and hands out
//! the factory used to build its adaptor.

/// Base trait for adaptor registries.
pub trait ImplementationRegistry {
	/// Network name as used in configuration and in request `chain` fields,
	/// for example "Ethereum".
	const NAME: &'static str;

	/// Factory function type produced by this registry.
	type Factory;

	/// Returns the factory that constructs the adaptor for this network.
	fn factory() -> Self::Factory;
}
