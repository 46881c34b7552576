//! Compositing an overlay page onto an existing page.
//!
//! The overlay page becomes a Form XObject inside the target document. The
//! target page's original content is wrapped in `q … Q` so that its graphics
//! state cannot leak into the stamp, and the form is painted afterwards, on
//! top of everything else. No other page is modified.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument};

use crate::error::{PdfStampError, Result};
use crate::utils;

/// Prefix of the XObject resource names given to merged overlays.
const XOBJECT_PREFIX: &str = "Stamp";

/// Merges overlay documents onto pages of a target document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageMerger;

impl PageMerger {
    /// Create a new merger.
    pub fn new() -> Self {
        Self
    }

    /// Composite the first page of `overlay` on top of `page_id` in `target`.
    ///
    /// Returns the resource name under which the overlay was registered.
    ///
    /// # Errors
    ///
    /// Returns [`PdfStampError::MergeFailed`] if the overlay has no page or
    /// the target page is not a dictionary.
    #[instrument(skip(self, target, overlay), level = "debug")]
    pub fn merge(
        &self,
        target: &mut Document,
        page_id: ObjectId,
        mut overlay: Document,
    ) -> Result<String> {
        if !matches!(target.get_object(page_id), Ok(Object::Dictionary(_))) {
            return Err(PdfStampError::merge_failed(format!(
                "target page {page_id:?} is not a page dictionary"
            )));
        }

        // Move overlay object ids above the target's so they can be copied
        // across without collisions.
        overlay.renumber_objects_with(target.max_id + 1);

        let overlay_page_id = *overlay
            .get_pages()
            .values()
            .next()
            .ok_or_else(|| PdfStampError::merge_failed("overlay document has no pages"))?;

        let content = overlay
            .get_page_content(overlay_page_id)
            .map_err(|e| PdfStampError::merge_failed(format!("overlay content: {e}")))?;
        let bbox = utils::media_box(&overlay, overlay_page_id);
        let resources = Object::Dictionary(utils::page_resources(&overlay, overlay_page_id));

        utils::copy_references(target, &overlay, &resources);
        target.max_id = target.max_id.max(overlay.max_id);

        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => bbox.iter().map(|v| Object::Real(*v)).collect::<Vec<_>>(),
                "Resources" => resources,
            },
            content,
        );
        let form_id = target.add_object(form);

        let name = register_xobject(target, page_id, form_id)?;
        wrap_contents(target, page_id, &name)?;

        debug!(?page_id, ?form_id, name = %name, "Merged overlay onto page");

        Ok(name)
    }
}

/// Add `form_id` to the page's own `/XObject` resources under a fresh name.
///
/// Resource dictionaries that are inherited or shared through a reference are
/// copied into the page first, so other pages keep seeing their original
/// resources.
fn register_xobject(doc: &mut Document, page_id: ObjectId, form_id: ObjectId) -> Result<String> {
    let mut resources = utils::page_resources(doc, page_id);

    let mut xobjects = match resources.get(b"XObject") {
        Ok(obj) => match utils::resolve(doc, obj) {
            Some(Object::Dictionary(dict)) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };

    let name = (0..)
        .map(|i| format!("{XOBJECT_PREFIX}{i}"))
        .find(|candidate| !xobjects.has(candidate.as_bytes()))
        .unwrap_or_else(|| XOBJECT_PREFIX.to_string());

    xobjects.set(name.as_str(), Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    page_dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));

    Ok(name)
}

/// Replace the page contents with `[q, <original…>, Q q /name Do Q]`.
fn wrap_contents(doc: &mut Document, page_id: ObjectId, name: &str) -> Result<()> {
    let existing: Vec<Object> = {
        let page = doc
            .get_dictionary(page_id)
            .map_err(|e| PdfStampError::merge_failed(e.to_string()))?;

        match page.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            _ => Vec::new(),
        }
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open_id));
        contents.extend(existing.iter().cloned());
    }

    let close = if existing.is_empty() {
        format!("q /{name} Do Q\n")
    } else {
        format!("\nQ\nq /{name} Do Q\n")
    };
    let close_id = doc.add_object(Stream::new(Dictionary::new(), close.into_bytes()));
    contents.push(Object::Reference(close_id));

    page_dictionary_mut(doc, page_id)?.set("Contents", Object::Array(contents));

    Ok(())
}

fn page_dictionary_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary> {
    doc.get_dictionary_mut(page_id)
        .map_err(|e| PdfStampError::merge_failed(format!("page {page_id:?}: {e}")))
}
