//! Well-formedness checks quick-xml leaves to the caller.
//!
//! The tokenizer accepts unbound prefixes and undefined entity references;
//! a feed carrying either is rejected before anything is rewritten.

use anyhow::{Result, bail};
use quick_xml::NsReader;
use quick_xml::events::BytesStart;
use quick_xml::name::ResolveResult;

/// Rejects unbound prefixes on the element and its attributes, and undefined
/// references in attribute values.
pub(super) fn element(reader: &NsReader<&[u8]>, start: &BytesStart) -> Result<()> {
    let (resolved, _) = reader.resolve_element(start.name());
    if let ResolveResult::Unknown(prefix) = resolved {
        bail!(
            "Unbound namespace prefix '{}' on element <{}>",
            String::from_utf8_lossy(&prefix),
            String::from_utf8_lossy(start.name().as_ref())
        );
    }

    for attr in start.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();

        if !key.starts_with(b"xmlns") {
            let (resolved, _) = reader.resolve_attribute(attr.key);
            if let ResolveResult::Unknown(prefix) = resolved {
                bail!(
                    "Unbound namespace prefix '{}' on attribute {}",
                    String::from_utf8_lossy(&prefix),
                    String::from_utf8_lossy(key)
                );
            }
        }

        references(&attr.value)?;
    }

    Ok(())
}

/// Rejects `&name;` references other than the predefined entities and
/// valid character references.
pub(super) fn references(raw: &[u8]) -> Result<()> {
    let mut rest = raw;

    while let Some(amp) = rest.iter().position(|&b| b == b'&') {
        let after = &rest[amp + 1..];
        let Some(semi) = after.iter().position(|&b| b == b';') else {
            bail!("Unterminated entity reference");
        };
        reference_name(&after[..semi])?;
        rest = &after[semi + 1..];
    }

    Ok(())
}

/// Checks the name between `&` and `;`.
pub(super) fn reference_name(name: &[u8]) -> Result<()> {
    let (digits, radix) = match name {
        b"lt" | b"gt" | b"amp" | b"apos" | b"quot" => return Ok(()),
        [b'#', b'x', hex @ ..] => (hex, 16),
        [b'#', dec @ ..] => (dec, 10),
        _ => bail!("Undefined entity: &{};", String::from_utf8_lossy(name)),
    };

    let valid = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| u32::from_str_radix(s, radix).ok())
        .and_then(char::from_u32)
        .is_some_and(|c| c != '\0');

    if !valid {
        bail!(
            "Invalid character reference: &{};",
            String::from_utf8_lossy(name)
        );
    }

    Ok(())
}
