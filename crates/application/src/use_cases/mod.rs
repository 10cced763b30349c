pub mod dns;

pub use dns::{Resolution, ResolutionPolicy, ResolutionSource, ResolveQueryUseCase};
