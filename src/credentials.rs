//! Loads the short-lived backend key into the session.

use log::info;

use crate::backend::Backend;
use crate::error::BridgeResult;
use crate::session::SessionState;

/// Fetch the key and store it in `session`.
///
/// On failure the session is left untouched; the caller decides how loudly
/// to report it.
pub async fn load_key<B: Backend, V>(backend: &B, session: &SessionState<V>) -> BridgeResult<()> {
	let key = backend.fetch_key().await?;
	session.set_api_key(key);
	info!("Loaded API key successfully");
	Ok(())
}
