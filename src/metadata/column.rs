use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Columns keyed by lower-cased name, in the given order.
    pub fn new_map(
        columns: impl IntoIterator<Item = (impl Into<String>, DataType)>,
    ) -> IndexMap<String, Self> {
        columns
            .into_iter()
            .map(|(name, data_type)| {
                let column = Column::new(name, data_type);
                (column.name.to_lowercase(), column)
            })
            .collect()
    }
}
