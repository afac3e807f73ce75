//! Line-oriented template preprocessing.
//!
//! Directives start at column zero: `#ifdef`, `#ifndef`, `#if`, `#else`,
//! `#endif` and `#literal`. Every other line, including ordinary `# comment`
//! lines, is emitted with token substitution applied.
use crate::tokens::TokenMap;
use anyhow::{anyhow, Result};
use regex::Regex;

struct Frame {
    parent_active: bool,
    condition: bool,
    seen_else: bool,
}

impl Frame {
    fn active(&self) -> bool {
        self.parent_active && (self.condition != self.seen_else)
    }
}

/// Template preprocessor; compile once and reuse across templates.
pub struct Preprocessor {
    directive: Regex,
}

impl Preprocessor {
    pub fn new() -> Result<Self> {
        let directive =
            Regex::new(r"^#(ifdef|ifndef|if|else|endif|literal)(?:[ \t]+(.*?))?[ \t]*$")
                .map_err(|err| anyhow!("compile directive pattern: {err}"))?;
        Ok(Self { directive })
    }

    /// Preprocess a template body. `origin` names the template in errors.
    pub fn run(&self, text: &str, tokens: &TokenMap, origin: &str) -> Result<String> {
        preprocess(&self.directive, text, tokens, origin)
    }
}

fn preprocess(directive: &Regex, text: &str, tokens: &TokenMap, origin: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut stack: Vec<Frame> = Vec::new();

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let active = stack.last().is_none_or(Frame::active);
        let body = line.trim_end_matches(['\n', '\r']);
        let Some(caps) = directive.captures(body) else {
            if active {
                out.push_str(&tokens.substitute(line));
            }
            continue;
        };
        let keyword = caps.get(1).map_or("", |m| m.as_str());
        let argument = caps.get(2).map_or("", |m| m.as_str());
        match keyword {
            "ifdef" | "ifndef" | "if" => {
                if argument.is_empty() {
                    return Err(anyhow!("{origin}:{line_no}: #{keyword} needs a token name"));
                }
                let condition = match keyword {
                    "ifdef" => tokens.contains(argument),
                    "ifndef" => !tokens.contains(argument),
                    _ => tokens.get(argument).is_some_and(|value| !value.is_empty()),
                };
                stack.push(Frame {
                    parent_active: active,
                    condition,
                    seen_else: false,
                });
            }
            "else" => {
                let frame = stack
                    .last_mut()
                    .ok_or_else(|| anyhow!("{origin}:{line_no}: #else without #if"))?;
                if frame.seen_else {
                    return Err(anyhow!("{origin}:{line_no}: duplicate #else"));
                }
                frame.seen_else = true;
            }
            "endif" => {
                stack
                    .pop()
                    .ok_or_else(|| anyhow!("{origin}:{line_no}: #endif without #if"))?;
            }
            _ => {
                if active {
                    out.push_str(argument);
                    out.push_str(&line[body.len()..]);
                }
            }
        }
    }

    if !stack.is_empty() {
        return Err(anyhow!("{origin}: {} unterminated #if block(s)", stack.len()));
    }
    Ok(out)
}
