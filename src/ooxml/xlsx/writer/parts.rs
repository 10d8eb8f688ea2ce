//! Package-level parts of a workbook: content types, relationships,
//! document properties and `xl/workbook.xml`.

use std::io::Write;

use crate::common::xml::XmlWriter;
use crate::ooxml::opc::constants::{XSI_TYPE_W3CDTF, content_type, namespace, relationship_type};

use super::names::NameEntry;

/// What the workbook contains, as far as the package parts care.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartSummary<'a> {
    pub sheet_names: &'a [String],
    pub has_shared_strings: bool,
    /// 0-based index of the tab shown when the file is opened
    pub active_tab: usize,
    pub defined_names: &'a [NameEntry],
}

impl PartSummary<'_> {
    fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }
}

fn relationship<W: Write>(w: &mut XmlWriter<W>, id: &str, rel_type: &str, target: &str) {
    w.open_light_tag("Relationship")
        .attribute("Id", id)
        .attribute("Type", rel_type)
        .attribute("Target", target)
        .close_light_tag();
}

fn override_part<W: Write>(w: &mut XmlWriter<W>, part_name: &str, ct: &str) {
    w.open_light_tag("Override")
        .attribute("PartName", part_name)
        .attribute("ContentType", ct)
        .close_light_tag();
}

/// `[Content_Types].xml`
pub fn write_content_types<W: Write>(w: &mut XmlWriter<W>, summary: &PartSummary<'_>) {
    w.open_tag("Types").attribute("xmlns", namespace::OPC_CONTENT_TYPES);
    for (extension, ct) in [("rels", content_type::OPC_RELATIONSHIPS), ("xml", content_type::XML)] {
        w.open_light_tag("Default")
            .attribute("Extension", extension)
            .attribute("ContentType", ct)
            .close_light_tag();
    }

    override_part(w, "/xl/workbook.xml", content_type::SML_SHEET_MAIN);
    for index in 1..=summary.sheet_count() {
        let part_name = format!("/xl/worksheets/sheet{index}.xml");
        override_part(w, &part_name, content_type::SML_WORKSHEET);
    }
    override_part(w, "/xl/styles.xml", content_type::SML_STYLES);
    if summary.has_shared_strings {
        override_part(w, "/xl/sharedStrings.xml", content_type::SML_SHARED_STRINGS);
    }
    override_part(w, "/docProps/core.xml", content_type::OPC_CORE_PROPERTIES);
    override_part(w, "/docProps/app.xml", content_type::OFC_EXTENDED_PROPERTIES);
    w.close_tag_named("Types");
}

/// `_rels/.rels`
pub fn write_package_rels<W: Write>(w: &mut XmlWriter<W>) {
    w.open_tag("Relationships").attribute("xmlns", namespace::OPC_RELATIONSHIPS);
    relationship(w, "rId3", relationship_type::EXTENDED_PROPERTIES, "docProps/app.xml");
    relationship(w, "rId2", relationship_type::CORE_PROPERTIES, "docProps/core.xml");
    relationship(w, "rId1", relationship_type::OFFICE_DOCUMENT, "xl/workbook.xml");
    w.close_tag_named("Relationships");
}

/// `docProps/core.xml`; `timestamp` is a W3CDTF date-time.
pub fn write_core_properties<W: Write>(w: &mut XmlWriter<W>, author: &str, timestamp: &str) {
    w.open_tag("cp:coreProperties")
        .attribute("xmlns:cp", namespace::CP)
        .attribute("xmlns:dc", namespace::DC)
        .attribute("xmlns:dcterms", namespace::DCTERMS)
        .attribute("xmlns:dcmitype", namespace::DCMITYPE)
        .attribute("xmlns:xsi", namespace::XSI);
    w.tag_only_content("dc:creator", author);
    w.tag_only_content("cp:lastModifiedBy", author);
    for name in ["dcterms:created", "dcterms:modified"] {
        w.open_tag(name)
            .attribute("xsi:type", XSI_TYPE_W3CDTF)
            .content(timestamp)
            .close_tag_named(name);
    }
    w.close_tag_named("cp:coreProperties");
}

/// `docProps/app.xml`
pub fn write_app_properties<W: Write>(w: &mut XmlWriter<W>, summary: &PartSummary<'_>) {
    w.open_tag("Properties")
        .attribute("xmlns", namespace::EXTENDED_PROPERTIES)
        .attribute("xmlns:vt", namespace::VT);
    w.tag_only_content("Application", "Microsoft Excel")
        .tag_only_content("DocSecurity", 0)
        .tag_only_content("ScaleCrop", "false");

    w.open_tag("HeadingPairs")
        .open_tag("vt:vector")
        .attribute("size", 2)
        .attribute("baseType", "variant");
    w.open_tag("vt:variant")
        .tag_only_content("vt:lpstr", "Worksheets")
        .close_tag_named("vt:variant");
    w.open_tag("vt:variant")
        .tag_only_content("vt:i4", summary.sheet_count())
        .close_tag_named("vt:variant");
    w.close_tag_named("vt:vector").close_tag_named("HeadingPairs");

    w.open_tag("TitlesOfParts")
        .open_tag("vt:vector")
        .attribute("size", summary.sheet_count())
        .attribute("baseType", "lpstr");
    for name in summary.sheet_names {
        w.tag_only_content("vt:lpstr", name.as_str());
    }
    w.close_tag_named("vt:vector").close_tag_named("TitlesOfParts");

    w.tag_only_content("Company", "")
        .tag_only_content("LinksUpToDate", "false")
        .tag_only_content("SharedDoc", "false")
        .tag_only_content("HyperlinksChanged", "false")
        .tag_only_content("AppVersion", 14.03);
    w.close_tag_named("Properties");
}

/// `xl/workbook.xml`
pub fn write_workbook<W: Write>(w: &mut XmlWriter<W>, summary: &PartSummary<'_>) {
    w.open_tag("workbook")
        .attribute("xmlns", namespace::SML_MAIN)
        .attribute("xmlns:r", namespace::OFC_RELATIONSHIPS);
    w.open_light_tag("fileVersion")
        .attribute("appName", "xl")
        .attribute("lastEdited", 5)
        .attribute("lowestEdited", 5)
        .attribute("rupBuild", 9303)
        .close_light_tag();
    w.open_light_tag("workbookPr").attribute("defaultThemeVersion", 124226).close_light_tag();

    w.open_tag("bookViews");
    w.open_light_tag("workbookView")
        .attribute("xWindow", 270)
        .attribute("yWindow", 630)
        .attribute("windowWidth", 24615)
        .attribute("windowHeight", 11445)
        .attribute("activeTab", summary.active_tab)
        .close_light_tag();
    w.close_tag_named("bookViews");

    w.open_tag("sheets");
    for (i, name) in summary.sheet_names.iter().enumerate() {
        let index = i + 1;
        w.open_light_tag("sheet")
            .attribute("name", name.as_str())
            .attribute("sheetId", index)
            .attribute("r:id", format!("rId{index}"))
            .close_light_tag();
    }
    w.close_tag_named("sheets");

    if !summary.defined_names.is_empty() {
        w.open_tag("definedNames");
        for entry in summary.defined_names {
            w.open_tag("definedName").attribute("name", entry.name.as_str());
            if let Some(comment) = &entry.comment {
                w.attribute("comment", comment.as_str());
            }
            if let Some(sheet) = entry.local_sheet_id {
                w.attribute("localSheetId", sheet);
            }
            w.content(entry.formula.as_str()).close_tag_named("definedName");
        }
        w.close_tag_named("definedNames");
    }

    w.open_light_tag("calcPr")
        .attribute("calcId", 124519)
        .attribute("fullCalcOnLoad", true)
        .close_light_tag();
    w.close_tag_named("workbook");
}

/// `xl/_rels/workbook.xml.rels`
///
/// Worksheets take `rId1..=rIdN`; styles and shared strings follow.
pub fn write_workbook_rels<W: Write>(w: &mut XmlWriter<W>, summary: &PartSummary<'_>) {
    w.open_tag("Relationships").attribute("xmlns", namespace::OPC_RELATIONSHIPS);
    let mut next_id = 1;
    for index in 1..=summary.sheet_count() {
        let target = format!("worksheets/sheet{index}.xml");
        relationship(w, &format!("rId{next_id}"), relationship_type::WORKSHEET, &target);
        next_id += 1;
    }
    relationship(w, &format!("rId{next_id}"), relationship_type::STYLES, "styles.xml");
    next_id += 1;
    if summary.has_shared_strings {
        relationship(
            w,
            &format!("rId{next_id}"),
            relationship_type::SHARED_STRINGS,
            "sharedStrings.xml",
        );
    }
    w.close_tag_named("Relationships");
}
