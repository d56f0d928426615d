//! TeX math to Unicode text.
//!
//! A terminal can't typeset, so commands become their Unicode symbols,
//! `^`/`_` become super/subscripts where Unicode has them, and `\frac`,
//! `\sqrt` and font commands are flattened. Input that can't be converted
//! is an error so the caller can show the source instead.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("unbalanced braces")]
    Unbalanced,
    #[error("\\{0} is missing an argument")]
    MissingArgument(String),
    #[error("unknown command \\{0}")]
    UnknownCommand(String),
}

const SYMBOLS: &[(&str, &str)] = &[
    ("alpha", "α"), ("beta", "β"), ("gamma", "γ"), ("delta", "δ"), ("epsilon", "ε"),
    ("varepsilon", "ε"), ("zeta", "ζ"), ("eta", "η"), ("theta", "θ"), ("vartheta", "ϑ"),
    ("iota", "ι"), ("kappa", "κ"), ("lambda", "λ"), ("mu", "μ"), ("nu", "ν"), ("xi", "ξ"),
    ("pi", "π"), ("rho", "ρ"), ("sigma", "σ"), ("tau", "τ"), ("upsilon", "υ"), ("phi", "φ"),
    ("varphi", "ϕ"), ("chi", "χ"), ("psi", "ψ"), ("omega", "ω"),
    ("Gamma", "Γ"), ("Delta", "Δ"), ("Theta", "Θ"), ("Lambda", "Λ"), ("Xi", "Ξ"), ("Pi", "Π"),
    ("Sigma", "Σ"), ("Phi", "Φ"), ("Psi", "Ψ"), ("Omega", "Ω"),
    ("int", "∫"), ("iint", "∬"), ("oint", "∮"), ("sum", "∑"), ("prod", "∏"), ("partial", "∂"),
    ("nabla", "∇"), ("infty", "∞"), ("lim", "lim"), ("log", "log"), ("ln", "ln"), ("exp", "exp"),
    ("sin", "sin"), ("cos", "cos"), ("tan", "tan"), ("max", "max"), ("min", "min"),
    ("leq", "≤"), ("le", "≤"), ("geq", "≥"), ("ge", "≥"), ("neq", "≠"), ("ne", "≠"),
    ("approx", "≈"), ("equiv", "≡"), ("sim", "∼"), ("propto", "∝"), ("pm", "±"), ("mp", "∓"),
    ("times", "×"), ("div", "÷"), ("cdot", "·"), ("circ", "∘"), ("star", "⋆"),
    ("to", "→"), ("rightarrow", "→"), ("leftarrow", "←"), ("leftrightarrow", "↔"),
    ("Rightarrow", "⇒"), ("Leftarrow", "⇐"), ("Leftrightarrow", "⇔"), ("implies", "⇒"),
    ("iff", "⇔"), ("mapsto", "↦"), ("uparrow", "↑"), ("downarrow", "↓"),
    ("in", "∈"), ("notin", "∉"), ("subset", "⊂"), ("supset", "⊃"), ("subseteq", "⊆"),
    ("supseteq", "⊇"), ("cup", "∪"), ("cap", "∩"), ("emptyset", "∅"), ("varnothing", "∅"),
    ("forall", "∀"), ("exists", "∃"), ("neg", "¬"), ("land", "∧"), ("wedge", "∧"),
    ("lor", "∨"), ("vee", "∨"), ("ldots", "…"), ("dots", "…"), ("cdots", "⋯"), ("vdots", "⋮"),
    ("hbar", "ℏ"), ("ell", "ℓ"), ("Re", "ℜ"), ("Im", "ℑ"), ("aleph", "ℵ"), ("degree", "°"),
    ("langle", "⟨"), ("rangle", "⟩"), ("lfloor", "⌊"), ("rfloor", "⌋"), ("lceil", "⌈"),
    ("rceil", "⌉"), ("quad", "  "), ("qquad", "    "),
];

/// Commands that vanish, leaving whatever follows them.
const SIZING: &[&str] = &[
    "left", "right", "big", "Big", "bigg", "Bigg", "displaystyle", "textstyle", "limits",
];

/// Commands whose single argument is shown as-is.
const FONTS: &[&str] = &[
    "text", "textrm", "textbf", "textit", "mathrm", "mathbf", "mathit", "mathsf", "mathtt",
    "mathcal", "operatorname", "boldsymbol",
];

/// Converts TeX math source to a Unicode approximation.
pub fn to_unicode(src: &str) -> Result<String, MathError> {
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0;
    let out = convert(&chars, &mut pos, false)?;
    Ok(out.trim().to_string())
}

fn convert(chars: &[char], pos: &mut usize, nested: bool) -> Result<String, MathError> {
    let mut out = String::new();
    while let Some(&c) = chars.get(*pos) {
        *pos += 1;
        match c {
            '}' if nested => return Ok(out),
            '}' => return Err(MathError::Unbalanced),
            '{' => out.push_str(&convert(chars, pos, true)?),
            '\\' => {
                let name = read_command(chars, pos);
                out.push_str(&command(&name, chars, pos)?);
            }
            '^' | '_' => {
                let arg = argument(chars, pos, &c.to_string())?;
                out.push_str(&script(c == '^', &arg));
            }
            _ => out.push(c),
        }
    }
    if nested {
        Err(MathError::Unbalanced)
    } else {
        Ok(out)
    }
}

fn read_command(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while chars.get(*pos).is_some_and(|c| c.is_ascii_alphabetic()) {
        *pos += 1;
    }
    if *pos == start {
        // control symbol like \, or \{
        if let Some(&c) = chars.get(*pos) {
            *pos += 1;
            return c.to_string();
        }
    }
    chars[start..*pos].iter().collect()
}

/// Reads one argument: a `{group}`, a command, or a single character.
fn argument(chars: &[char], pos: &mut usize, owner: &str) -> Result<String, MathError> {
    while chars.get(*pos).is_some_and(|c| *c == ' ') {
        *pos += 1;
    }
    let Some(&c) = chars.get(*pos) else {
        return Err(MathError::MissingArgument(owner.to_string()));
    };
    *pos += 1;
    match c {
        '{' => convert(chars, pos, true),
        '\\' => {
            let name = read_command(chars, pos);
            command(&name, chars, pos)
        }
        '}' => Err(MathError::Unbalanced),
        _ => Ok(c.to_string()),
    }
}

fn command(name: &str, chars: &[char], pos: &mut usize) -> Result<String, MathError> {
    match name {
        "frac" | "dfrac" | "tfrac" => {
            let num = argument(chars, pos, name)?;
            let den = argument(chars, pos, name)?;
            Ok(fraction(&num, &den))
        }
        "sqrt" => {
            let index = optional_index(chars, pos)?;
            let radicand = argument(chars, pos, name)?;
            let root = match index.as_deref() {
                Some("3") => "∛",
                Some("4") => "∜",
                _ => "√",
            };
            Ok(format!("{root}{}", grouped(&radicand)))
        }
        "mathbb" => Ok(argument(chars, pos, name)?.chars().map(double_struck).collect()),
        _ if FONTS.contains(&name) => argument(chars, pos, name),
        _ if SIZING.contains(&name) => Ok(String::new()),
        "," | ":" | ";" | " " => Ok(" ".to_string()),
        "!" => Ok(String::new()),
        "\\" => Ok("\n".to_string()),
        "{" | "}" | "%" | "$" | "&" | "#" | "_" | "|" => Ok(name.to_string()),
        _ => SYMBOLS
            .iter()
            .find(|(cmd, _)| *cmd == name)
            .map(|(_, sym)| sym.to_string())
            .ok_or_else(|| MathError::UnknownCommand(name.to_string())),
    }
}

fn optional_index(chars: &[char], pos: &mut usize) -> Result<Option<String>, MathError> {
    if chars.get(*pos) != Some(&'[') {
        return Ok(None);
    }
    let close = chars[*pos..]
        .iter()
        .position(|c| *c == ']')
        .ok_or(MathError::Unbalanced)?;
    let index = chars[*pos + 1..*pos + close].iter().collect();
    *pos += close + 1;
    Ok(Some(index))
}

fn fraction(num: &str, den: &str) -> String {
    if num.chars().count() == 1 && den.chars().count() == 1 {
        format!("{num}⁄{den}")
    } else {
        format!("{}/{}", grouped(num), grouped(den))
    }
}

fn grouped(s: &str) -> String {
    if s.chars().count() <= 1 {
        s.to_string()
    } else {
        format!("({s})")
    }
}

fn script(superscript: bool, arg: &str) -> String {
    let map = if superscript { superscript_char } else { subscript_char };
    match arg.chars().map(map).collect::<Option<String>>() {
        Some(converted) => converted,
        None => {
            let marker = if superscript { '^' } else { '_' };
            if arg.chars().count() == 1 {
                format!("{marker}{arg}")
            } else {
                format!("{marker}({arg})")
            }
        }
    }
}

pub fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰', '1' => '¹', '2' => '²', '3' => '³', '4' => '⁴',
        '5' => '⁵', '6' => '⁶', '7' => '⁷', '8' => '⁸', '9' => '⁹',
        '+' => '⁺', '-' => '⁻', '=' => '⁼', '(' => '⁽', ')' => '⁾',
        'n' => 'ⁿ', 'i' => 'ⁱ', 'x' => 'ˣ', 'T' => 'ᵀ', '*' => '*', '′' => '′',
        _ => return None,
    })
}

pub fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀', '1' => '₁', '2' => '₂', '3' => '₃', '4' => '₄',
        '5' => '₅', '6' => '₆', '7' => '₇', '8' => '₈', '9' => '₉',
        '+' => '₊', '-' => '₋', '=' => '₌', '(' => '₍', ')' => '₎',
        'a' => 'ₐ', 'e' => 'ₑ', 'o' => 'ₒ', 'x' => 'ₓ', 'h' => 'ₕ',
        'i' => 'ᵢ', 'j' => 'ⱼ', 'k' => 'ₖ', 'l' => 'ₗ', 'm' => 'ₘ',
        'n' => 'ₙ', 'p' => 'ₚ', 's' => 'ₛ', 't' => 'ₜ',
        _ => return None,
    })
}

fn double_struck(c: char) -> char {
    match c {
        'C' => 'ℂ', 'H' => 'ℍ', 'N' => 'ℕ', 'P' => 'ℙ', 'Q' => 'ℚ', 'R' => 'ℝ', 'Z' => 'ℤ',
        _ => c,
    }
}
