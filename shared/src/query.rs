use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    /// How the value appears inside a signing string; lists are comma joined.
    pub fn signing_repr(&self) -> String {
        match self {
            ParamValue::Single(value) => value.clone(),
            ParamValue::List(values) => values.join(","),
        }
    }
}

/// Ordered set of request parameters. Absent fields are never pushed, so they show up
/// neither in the signing string nor in the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedParams(Vec<(&'static str, ParamValue)>);

impl SignedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.0.push((name, ParamValue::Single(value.into())));
        self
    }

    pub fn push_list(&mut self, name: &'static str, values: Vec<String>) -> &mut Self {
        self.0.push((name, ParamValue::List(values)));
        self
    }

    /// Pushes only a present, non-empty value.
    pub fn push_opt(&mut self, name: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.push(name, value);
        }
        self
    }

    /// Pushes a present, non-empty list.
    pub fn push_opt_list(&mut self, name: &'static str, values: Option<&[String]>) -> &mut Self {
        if let Some(values) = values.filter(|v| !v.is_empty()) {
            self.push_list(name, values.to_vec());
        }
        self
    }

    /// Pushes the literal `"true"` when set; a false flag is left out entirely.
    pub fn push_flag(&mut self, name: &'static str, set: bool) -> &mut Self {
        if set {
            self.push(name, "true");
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(n, _)| *n)
    }

    /// Joins the fields named in `order` that are present with `/`, in `order`'s order
    /// regardless of insertion order.
    pub fn signing_string(&self, order: &[&str]) -> String {
        order
            .iter()
            .filter_map(|name| self.get(name))
            .map(ParamValue::signing_repr)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Form-encodes every pair in insertion order. Lists become repeated `name[]` keys
    /// (`name%5B%5D` once encoded).
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.0 {
            match value {
                ParamValue::Single(value) => {
                    serializer.append_pair(name, value);
                }
                ParamValue::List(values) => {
                    let array_name = format!("{name}[]");
                    for value in values {
                        serializer.append_pair(&array_name, value);
                    }
                }
            }
        }
        serializer.finish()
    }
}
