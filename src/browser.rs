//! Thin wrappers over the browser file APIs used by export and import.

use log::warn;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, File, HtmlAnchorElement, Url};

use crate::graph::ImportError;

/// How long an exported file's object URL stays valid after the click.
const REVOKE_DELAY_MS: i32 = 1_000;

#[derive(Error, Debug)]
pub enum BrowserError {
	#[error("no window or document available")]
	NoDocument,

	#[error("{context} failed: {message}")]
	Js {
		context: &'static str,
		message: String,
	},
}

pub type Result<T> = std::result::Result<T, BrowserError>;

fn describe(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(context: &'static str) -> impl FnOnce(JsValue) -> BrowserError {
	move |value| BrowserError::Js {
		context,
		message: describe(&value),
	}
}

/// Offer `text` to the user as a file called `file_name`.
pub fn download_text(file_name: &str, mime: &str, text: &str) -> Result<()> {
	let window = web_sys::window().ok_or(BrowserError::NoDocument)?;
	let document = window.document().ok_or(BrowserError::NoDocument)?;

	let parts = js_sys::Array::of1(&JsValue::from_str(text));
	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)
		.map_err(js_error("creating blob"))?;
	let url = Url::create_object_url_with_blob(&blob).map_err(js_error("creating object URL"))?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")
		.map_err(js_error("creating link"))?
		.dyn_into()
		.map_err(|el| js_error("creating link")(el.into()))?;
	anchor.set_href(&url);
	anchor.set_download(file_name);
	anchor.click();

	// The download reads the URL asynchronously; revoking it now can cancel it.
	let revoke = Closure::once_into_js(move || {
		if let Err(err) = Url::revoke_object_url(&url) {
			warn!("revoking {url} failed: {}", describe(&err));
		}
	});
	window
		.set_timeout_with_callback_and_timeout_and_arguments_0(
			revoke.unchecked_ref(),
			REVOKE_DELAY_MS,
		)
		.map_err(js_error("scheduling object URL release"))?;
	Ok(())
}

/// Read a user-chosen file as UTF-8 text.
pub async fn read_file_text(file: &File) -> std::result::Result<String, ImportError> {
	let value = JsFuture::from(file.text())
		.await
		.map_err(|e| ImportError::Read(describe(&e)))?;
	value
		.as_string()
		.ok_or_else(|| ImportError::Read(format!("{} is not text", file.name())))
}

/// Milliseconds since the Unix epoch, from the browser clock.
pub fn now_millis() -> u64 {
	js_sys::Date::now() as u64
}
