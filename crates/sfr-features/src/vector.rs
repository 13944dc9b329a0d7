//! Model-ready feature vector

/// Model-ready row: values aligned with the expected feature columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub(crate) columns: Vec<String>,
    pub(crate) values: Vec<f64>,
}

impl FeatureVector {
    /// Column names in model order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in model order
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value by column name
    #[must_use]
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// `(column, value)` pairs in model order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    /// Number of features
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if vector has no features
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_and_order() {
        let v = FeatureVector {
            columns: vec!["Soil_pH".into(), "NPK_Ratio".into()],
            values: vec![6.5, 0.5],
        };
        assert_eq!(v.get("NPK_Ratio"), Some(0.5));
        assert_eq!(v.get("Region"), None);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![("Soil_pH", 6.5), ("NPK_Ratio", 0.5)]);
        assert_eq!(v.len(), 2);
    }
}
