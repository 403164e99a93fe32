// Session / auth layer.
// Identity comes from the OAuth gateway; this service only upserts users,
// issues session tokens and resolves the stored role on every request.

pub mod handlers;
pub mod role_gate;
pub mod session;
pub mod token;
