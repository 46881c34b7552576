//! Page-tree helpers shared by the renderer and the merger.

use lopdf::{Dictionary, Document, Object, ObjectId};

/// Maximum number of `/Parent` hops followed when resolving inherited
/// page attributes. Guards against cycles in malformed page trees.
const MAX_TREE_DEPTH: usize = 32;

/// US Letter, used when no MediaBox can be found.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Follow an indirect reference to the object it points at.
///
/// Direct objects are returned unchanged. Dangling references yield `None`.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up a page attribute, walking up the page tree for inheritable keys
/// such as `MediaBox`, `Rotate` and `Resources`.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(node_id).ok()?;

        if let Ok(value) = dict.get(key) {
            return resolve(doc, value).cloned();
        }

        node_id = match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => *parent_id,
            _ => return None,
        };
    }

    None
}

/// Numeric value of an integer or real object.
pub fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// MediaBox of a page as `[llx, lly, urx, ury]`, normalized so that
/// `llx <= urx` and `lly <= ury`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let values: Option<Vec<f32>> = match inherited_attribute(doc, page_id, b"MediaBox") {
        Some(Object::Array(arr)) if arr.len() == 4 => arr
            .iter()
            .map(|o| resolve(doc, o).and_then(as_number))
            .collect(),
        _ => None,
    };

    match values {
        Some(v) => [v[0].min(v[2]), v[1].min(v[3]), v[0].max(v[2]), v[1].max(v[3])],
        None => DEFAULT_MEDIA_BOX,
    }
}

/// Page rotation in degrees, normalized to one of 0, 90, 180 or 270.
///
/// Values that are not a multiple of 90 are treated as 0.
pub fn rotation(doc: &Document, page_id: ObjectId) -> u16 {
    let degrees = match inherited_attribute(doc, page_id, b"Rotate") {
        Some(Object::Integer(i)) => i,
        Some(Object::Real(r)) => r as i64,
        _ => 0,
    };

    let normalized = degrees.rem_euclid(360);
    if normalized % 90 == 0 {
        normalized as u16
    } else {
        0
    }
}

/// Resource dictionary that applies to a page, resolving references and
/// inheritance. Returns an empty dictionary if the page has none.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    }
}

/// Copy object references from one PDF document to another.
///
/// If `obj` is a reference, this walks the structure recursively and inserts
/// missing referenced objects into the `target` document. The caller must
/// make sure object ids of `source` do not collide with those of `target`.
pub fn copy_references(target: &mut Document, source: &Document, obj: &Object) {
    match obj {
        Object::Reference(ref_id) => {
            if !target.objects.contains_key(ref_id)
                && let Ok(referenced_obj) = source.get_object(*ref_id)
            {
                target.objects.insert(*ref_id, referenced_obj.clone());
                copy_references(target, source, referenced_obj);
            }
        }
        Object::Dictionary(dict) => {
            for (_, value) in dict.iter() {
                copy_references(target, source, value);
            }
        }
        Object::Array(arr) => {
            for item in arr {
                copy_references(target, source, item);
            }
        }
        Object::Stream(stream) => {
            for (_, value) in stream.dict.iter() {
                copy_references(target, source, value);
            }
        }
        _ => {}
    }
}
