use std::fmt;

/// Kind of document stored in the Configuration Server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Component,
    DataSource,
    Profile,
}

impl ItemKind {
    /// `-d` selects datasources and `-r` profiles; components otherwise.
    pub fn from_flags(datasources: bool, profiles: bool) -> Self {
        if datasources {
            ItemKind::DataSource
        } else if profiles {
            ItemKind::Profile
        } else {
            ItemKind::Component
        }
    }

    pub fn available_command(self) -> &'static str {
        match self {
            ItemKind::Component => "AvailableComponents",
            ItemKind::DataSource => "AvailableDataSources",
            ItemKind::Profile => "AvailableSelections",
        }
    }

    pub fn fetch_command(self) -> &'static str {
        match self {
            ItemKind::Component => "Components",
            ItemKind::DataSource => "DataSources",
            ItemKind::Profile => "Selections",
        }
    }

    pub fn delete_command(self) -> &'static str {
        match self {
            ItemKind::Component => "DeleteComponent",
            ItemKind::DataSource => "DeleteDataSource",
            ItemKind::Profile => "DeleteSelection",
        }
    }

    pub fn store_command(self) -> &'static str {
        match self {
            ItemKind::Component => "StoreComponent",
            ItemKind::DataSource => "StoreDataSource",
            ItemKind::Profile => "StoreSelection",
        }
    }

    /// Attribute holding the document before a store.
    pub fn document_attribute(self) -> &'static str {
        match self {
            ItemKind::Profile => "Selection",
            _ => "XMLString",
        }
    }

    /// File name suffix used by `upload`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            ItemKind::Component => ".xml",
            ItemKind::DataSource => ".ds.xml",
            ItemKind::Profile => ".json",
        }
    }

    /// Item name for a file in an upload directory, if the file holds this kind.
    pub fn name_from_file(self, file_name: &str) -> Option<String> {
        let stem = file_name.strip_suffix(self.file_suffix())?;
        if self == ItemKind::Component && stem.ends_with(".ds") {
            return None;
        }
        if stem.is_empty() {
            None
        } else {
            Some(stem.to_string())
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemKind::Component => "Component",
            ItemKind::DataSource => "DataSource",
            ItemKind::Profile => "Profile",
        };
        write!(f, "{}", label)
    }
}

/// One line of `nxsconfig describe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceRow {
    pub component: String,
    pub datasource: String,
    pub source_type: String,
    pub record: String,
}
