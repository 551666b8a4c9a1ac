// Adapters layer: concrete Supabase clients. The restricted client may be
// built anywhere; the privileged client only in the provisioning function.

pub mod credential;
pub(crate) mod http;
#[cfg(not(target_arch = "wasm32"))]
pub mod privileged;
pub mod restricted;
