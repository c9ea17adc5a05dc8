//! Stacking-sequence notation
//!
//! Tokens are separated by `/`. Each token is an optional sign (`+`, `-`,
//! `±`), an angle in degrees and an optional `xN` repeat. A trailing `s`
//! marks a symmetric laminate written as its half-stack. The sequence may be
//! wrapped in `[...]`, and a bracketed group may carry its own `xN` repeat:
//!
//! ```text
//! [0/±45/90]s     0x4/90x2     [-30/+60x3]     [0]x8     [0/90]x2s
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::elements::{PlyAngleSpec, MAX_PLIES};
use crate::error::{CltError, CltResult};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sign>±|\+|-)?(?P<angle>\d+(?:\.\d+)?)(?:[xX](?P<count>\d+))?$")
        .expect("token pattern is valid")
});

static GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<body>[^\[\]]*)\][xX](?P<count>\d+)$").expect("group pattern is valid"));

/// A parsed stacking sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSequence {
    /// Stacking entries; the half-stack when `symmetric`
    pub plies: Vec<PlyAngleSpec>,
    /// Mirror `plies` about the midplane when building
    pub symmetric: bool,
}

impl ParsedSequence {
    /// Number of physical plies after mirroring
    pub fn total_plies(&self) -> usize {
        let half: usize = self.plies.iter().map(|p| p.count).sum();
        if self.symmetric {
            2 * half
        } else {
            half
        }
    }
}

/// Parse a stacking sequence; every ply uses `material`
pub fn parse_sequence(text: &str, material: &str) -> CltResult<ParsedSequence> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let invalid = |reason: &str| CltError::InvalidSequence(format!("'{}': {}", text.trim(), reason));

    let (core, symmetric) = match compact.strip_suffix(|c: char| c == 's' || c == 'S') {
        Some(core) => (core, true),
        None => (compact.as_str(), false),
    };

    let (core, repeats) = match GROUP_RE.captures(core) {
        Some(caps) => {
            let repeats = caps["count"]
                .parse::<usize>()
                .map_err(|_| invalid("bad group repeat count"))?;
            let body = caps.name("body").map_or("", |m| m.as_str());
            (body, repeats)
        }
        None => match (core.strip_prefix('['), core.strip_suffix(']')) {
            (Some(_), Some(_)) => (&core[1..core.len() - 1], 1),
            (None, None) => (core, 1),
            _ => return Err(invalid("unbalanced brackets")),
        },
    };

    if repeats == 0 {
        return Err(invalid("zero group repeat count"));
    }
    if core.contains(|c: char| c == '[' || c == ']') {
        return Err(invalid("nested brackets"));
    }

    if core.is_empty() {
        return Err(invalid("no plies"));
    }

    let mut plies = Vec::new();
    for token in core.split('/') {
        let caps = TOKEN_RE
            .captures(token)
            .ok_or_else(|| invalid(&format!("malformed token '{}'", token)))?;

        let angle: f64 = caps["angle"]
            .parse()
            .map_err(|_| invalid(&format!("bad angle in '{}'", token)))?;
        let count = match caps.name("count") {
            Some(m) => m
                .as_str()
                .parse::<usize>()
                .map_err(|_| invalid(&format!("bad repeat count in '{}'", token)))?,
            None => 1,
        };
        if count == 0 {
            return Err(invalid(&format!("zero repeat count in '{}'", token)));
        }

        match caps.name("sign").map(|m| m.as_str()) {
            Some("±") => {
                plies.push(PlyAngleSpec::new(material, angle, count));
                plies.push(PlyAngleSpec::new(material, -angle, count));
            }
            Some("-") => plies.push(PlyAngleSpec::new(material, -angle, count)),
            _ => plies.push(PlyAngleSpec::new(material, angle, count)),
        }
    }

    let total = plies
        .iter()
        .fold(0usize, |acc, p| acc.saturating_add(p.count))
        .saturating_mul(repeats)
        .saturating_mul(if symmetric { 2 } else { 1 });
    if total > MAX_PLIES {
        return Err(CltError::out_of_range(
            "ply_count",
            total as f64,
            format!("a laminate holds at most {} plies", MAX_PLIES),
        ));
    }

    let group = plies.clone();
    for _ in 1..repeats {
        plies.extend(group.iter().cloned());
    }

    Ok(ParsedSequence { plies, symmetric })
}

fn format_angle(angle: f64) -> String {
    if angle.fract() == 0.0 {
        format!("{}", angle as i64)
    } else {
        format!("{}", angle)
    }
}

fn format_token(prefix: &str, angle: f64, count: usize) -> String {
    if count > 1 {
        format!("{}{}x{}", prefix, format_angle(angle), count)
    } else {
        format!("{}{}", prefix, format_angle(angle))
    }
}

/// Write stacking entries in compact notation, e.g. `[0/±45/90]s`.
///
/// Adjacent `+θ`/`−θ` entries with the same count and material collapse to
/// `±θ`. Materials and thickness overrides are not part of the notation.
pub fn format_sequence(plies: &[PlyAngleSpec], symmetric: bool) -> String {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < plies.len() {
        let ply = &plies[i];
        let pairs_with_next = plies.get(i + 1).is_some_and(|next| {
            ply.angle_deg > 0.0
                && next.angle_deg == -ply.angle_deg
                && next.count == ply.count
                && next.material == ply.material
        });

        if pairs_with_next {
            tokens.push(format_token("±", ply.angle_deg, ply.count));
            i += 2;
        } else {
            tokens.push(format_token("", ply.angle_deg, ply.count));
            i += 1;
        }
    }

    let body = format!("[{}]", tokens.join("/"));
    if symmetric {
        body + "s"
    } else {
        body
    }
}
