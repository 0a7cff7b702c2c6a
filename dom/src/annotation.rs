use roxmltree::Node;

/// One element from an `<xs:annotation><xs:appinfo>` block.
///
/// Applications use these to attach extra metadata to schema components, e.g.
/// `<sce.domgen include="false"/>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl Annotation {
    pub const TAG_NAME: &'static str = "annotation";

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Generate a textual representation of the content of an element.
    /// This is not meant to be the exact source; it should however be able to parse back into
    /// similar XML.
    fn content_to_text(node: Node) -> String {
        let mut text = String::new();
        for child in node.children() {
            match child.node_type() {
                roxmltree::NodeType::Text => text.push_str(child.text().unwrap_or_default()),
                roxmltree::NodeType::Element => {
                    let tag_name = child.tag_name().name();
                    text.push_str(&format!(
                        "<{tag_name}>{}</{tag_name}>",
                        Self::content_to_text(child)
                    ));
                }
                _ => {}
            }
        }
        text
    }

    fn map_from_xml(element: Node) -> Self {
        Self {
            name: element.tag_name().name().to_string(),
            namespace: element.tag_name().namespace().map(str::to_string),
            attributes: element
                .attributes()
                .map(|attribute| (attribute.name().to_string(), attribute.value().to_string()))
                .collect(),
            text: Self::content_to_text(element),
        }
    }

    /// Collects the application information elements annotating the schema component `node`.
    pub(crate) fn annotations_of(node: Node) -> Vec<Self> {
        node.children()
            .filter(|child| child.tag_name().name() == Self::TAG_NAME)
            .flat_map(|annotation| annotation.children())
            .filter(|child| child.tag_name().name() == "appinfo")
            .flat_map(|appinfo| appinfo.children())
            .filter(Node::is_element)
            .map(Self::map_from_xml)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_appinfo_elements() {
        let doc = roxmltree::Document::parse(
            r#"<xs:complexType xmlns:xs="http://www.w3.org/2001/XMLSchema" name="t">
                 <xs:annotation>
                   <xs:documentation>Ignored</xs:documentation>
                   <xs:appinfo>
                     <sce.domgen include="false"/>
                     <idAttribute name="name"/>
                     <note>some <b>text</b></note>
                   </xs:appinfo>
                 </xs:annotation>
               </xs:complexType>"#,
        )
        .unwrap();
        let annotations = Annotation::annotations_of(doc.root_element());
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotations[0].name, "sce.domgen");
        assert_eq!(annotations[0].attribute("include"), Some("false"));
        assert_eq!(annotations[1].attribute("name"), Some("name"));
        assert_eq!(annotations[2].text, "some <b>text</b>");
    }
}
