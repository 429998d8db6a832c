//! Parser for default appearance (`/DA`) strings
//!
//! A `/DA` string is a tiny content stream fragment such as
//! `/Helv 12 Tf 0 0 1 rg`. Only the font selection and the fill colour
//! matter for laying out free text; other operators are ignored.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultAppearance {
    /// Font resource name without the leading slash.
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    /// Components of the last `g`, `rg` or `k` operator.
    pub color: Option<Vec<f32>>,
}

impl DefaultAppearance {
    /// Lenient parse. Malformed operators are skipped rather than rejected.
    pub fn parse(da: &str) -> Self {
        let mut result = DefaultAppearance::default();
        let mut operands: Vec<&str> = Vec::new();

        for token in da.split_whitespace() {
            match token {
                "Tf" => {
                    if let [.., font, size] = operands.as_slice() {
                        if let (Some(name), Ok(size)) = (font.strip_prefix('/'), size.parse::<f32>()) {
                            result.font_name = Some(name.to_string());
                            result.font_size = Some(size);
                        }
                    }
                    operands.clear();
                }
                "g" | "rg" | "k" => {
                    let arity = match token {
                        "g" => 1,
                        "rg" => 3,
                        _ => 4,
                    };
                    if operands.len() >= arity {
                        let components: Option<Vec<f32>> = operands[operands.len() - arity..]
                            .iter()
                            .map(|v| v.parse::<f32>().ok())
                            .collect();
                        if components.is_some() {
                            result.color = components;
                        }
                    }
                    operands.clear();
                }
                _ if is_operator(token) => operands.clear(),
                _ => operands.push(token),
            }
        }

        result
    }
}

fn is_operator(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '\'' || c == '"')
}
