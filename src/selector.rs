//! The compact `tag#id.class.class` selector encoding.
//!
//! Splitting scans for the first `#`, then for the first `.` at or after it,
//! so an id segment may not follow a class segment. Degenerate selectors are
//! not rejected; they split along the same rules and simply name unusual tags.

pub struct SelectorParts<'a> {
	pub tag: &'a str,
	pub id: Option<&'a str>,
	/// Class names already joined with single spaces, ready for an attribute write.
	pub classes: Option<String>,
}

/// Splits a selector into tag, id and class list.
pub fn parse(sel: &str) -> SelectorParts<'_> {
	let hash_idx = sel.find('#');
	let dot_idx = match hash_idx {
		Some(hash_idx) => sel[hash_idx..].find('.').map(|dot_idx| dot_idx + hash_idx),
		None => sel.find('.'),
	};
	let hash = match hash_idx {
		Some(hash_idx) if hash_idx > 0 => hash_idx,
		_ => sel.len(),
	};
	let dot = match dot_idx {
		Some(dot_idx) if dot_idx > 0 => dot_idx,
		_ => sel.len(),
	};

	let tag = if hash_idx.is_some() || dot_idx.is_some() {
		&sel[..hash.min(dot)]
	} else {
		sel
	};
	let id = if hash < dot { Some(&sel[hash + 1..dot]) } else { None };
	let classes = match dot_idx {
		Some(dot_idx) if dot_idx > 0 => Some(sel[dot_idx + 1..].replace('.', " ")),
		_ => None,
	};

	SelectorParts { tag, id, classes }
}

/// Rebuilds a selector from the tag, id and class attributes of a live element.
///
/// Empty ids and class lists are skipped, so a bare element round-trips to its
/// plain tag name.
pub fn compose(tag: &str, id: Option<&str>, class: Option<&str>) -> String {
	let mut sel = String::from(tag);
	if let Some(id) = id {
		if !id.is_empty() {
			sel.push('#');
			sel.push_str(id);
		}
	}
	if let Some(class) = class {
		for name in class.split_whitespace() {
			sel.push('.');
			sel.push_str(name);
		}
	}
	sel
}

/// The tag segment alone, for namespace propagation checks.
pub fn tag_of(sel: &str) -> &str {
	parse(sel).tag
}
