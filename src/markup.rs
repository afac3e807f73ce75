//! XML and build-script fragments spliced into templates.
//!
//! Fragments are built one per input item and joined by the caller; callers
//! pass items in sorted order so output is stable across runs.
use crate::frontend::ClasspathEntry;
use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

const JAVA_SOURCES: &str = "**/*.java";
const MULTI_FILTER_MATCHER: &str = "org.eclipse.ui.ide.multiFilter";
// Eclipse's resource filter type for "exclude all, files and folders, recursive".
const FILTER_TYPE: &str = "30";
const IML_ORDER_ENTRY_INDENT: &str = "    ";
const IML_SOURCE_FOLDER_INDENT: &str = "      ";

fn write_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).context("write XML fragment")?;
    Ok(())
}

fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, &str)],
) -> Result<()> {
    let mut elem = BytesStart::new(name);
    for attr in attrs {
        elem.push_attribute(*attr);
    }
    write_event(writer, Event::Empty(elem))
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(value)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).context("XML fragment is not UTF-8")
}

/// A single empty element on one line.
fn empty_element(name: &str, attrs: &[(&str, &str)]) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_empty(&mut writer, name, attrs)?;
    into_string(writer)
}

/// `<classpathentry>` for a source root. Attributes are alphabetical.
pub fn classpath_entry(entry: &ClasspathEntry) -> Result<String> {
    let excluding: Vec<&str> = entry.exclude_patterns.iter().map(String::as_str).collect();
    let excluding = excluding.join("|");
    let mut elem = BytesStart::new("classpathentry");
    if !excluding.is_empty() {
        elem.push_attribute(("excluding", excluding.as_str()));
    }
    elem.push_attribute(("including", JAVA_SOURCES));
    elem.push_attribute(("kind", "src"));
    elem.push_attribute(("path", entry.path()));

    let mut writer = Writer::new(Vec::new());
    if entry.ignore_warnings {
        write_event(&mut writer, Event::Start(elem))?;
        write_event(&mut writer, Event::Start(BytesStart::new("attributes")))?;
        write_empty(
            &mut writer,
            "attribute",
            &[("name", "ignore_optional_problems"), ("value", "true")],
        )?;
        write_event(&mut writer, Event::End(BytesEnd::new("attributes")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("classpathentry")))?;
    } else {
        write_event(&mut writer, Event::Empty(elem))?;
    }
    into_string(writer)
}

/// `<classpathentry>` pointing at another project in the same workspace.
///
/// All projects share one root, so the reference is absolute in the IDE's
/// namespace.
pub fn referenced_project(name: &str) -> Result<String> {
    let path = format!("/{name}");
    empty_element(
        "classpathentry",
        &[
            ("combineaccessrules", "false"),
            ("kind", "src"),
            ("path", path.as_str()),
        ],
    )
}

/// `<classpathentry>` exporting a prebuilt JAR.
pub fn extra_jar(path: &str) -> Result<String> {
    empty_element(
        "classpathentry",
        &[("exported", "true"), ("kind", "lib"), ("path", path)],
    )
}

/// Pretty-printed `<filteredResources>` with one filter per argument.
///
/// `first_id` seeds the synthetic ids, which increase by one per filter.
pub fn filtered_resources<'a, I>(arguments: I, first_id: u64) -> Result<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_event(&mut writer, Event::Start(BytesStart::new("filteredResources")))?;
    for (id, argument) in (first_id..).zip(arguments) {
        write_event(&mut writer, Event::Start(BytesStart::new("filter")))?;
        write_text_element(&mut writer, "id", &id.to_string())?;
        write_empty(&mut writer, "name", &[])?;
        write_text_element(&mut writer, "type", FILTER_TYPE)?;
        write_event(&mut writer, Event::Start(BytesStart::new("matcher")))?;
        write_text_element(&mut writer, "id", MULTI_FILTER_MATCHER)?;
        write_text_element(&mut writer, "arguments", argument)?;
        write_event(&mut writer, Event::End(BytesEnd::new("matcher")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("filter")))?;
    }
    write_event(&mut writer, Event::End(BytesEnd::new("filteredResources")))?;
    into_string(writer)
}

/// Prefix every line of `xml` and end it with a newline.
fn indented(xml: &str, prefix: &str) -> String {
    xml.lines().map(|line| format!("{prefix}{line}\n")).collect()
}

/// IML `<orderEntry>` for a module dependency.
pub fn order_entry_module(module: &str) -> Result<String> {
    let xml = empty_element("orderEntry", &[("type", "module"), ("module-name", module)])?;
    Ok(indented(&xml, IML_ORDER_ENTRY_INDENT))
}

/// IML `<orderEntry>` for a JAR library.
pub fn order_entry_module_library(jar: &str) -> Result<String> {
    let url = format!("jar://{jar}!/");
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut entry = BytesStart::new("orderEntry");
    entry.push_attribute(("type", "module-library"));
    write_event(&mut writer, Event::Start(entry))?;
    write_event(&mut writer, Event::Start(BytesStart::new("library")))?;
    write_event(&mut writer, Event::Start(BytesStart::new("CLASSES")))?;
    write_empty(&mut writer, "root", &[("url", url.as_str())])?;
    write_event(&mut writer, Event::End(BytesEnd::new("CLASSES")))?;
    write_empty(&mut writer, "JAVADOC", &[])?;
    write_empty(&mut writer, "SOURCES", &[])?;
    write_event(&mut writer, Event::End(BytesEnd::new("library")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("orderEntry")))?;
    Ok(indented(&into_string(writer)?, IML_ORDER_ENTRY_INDENT))
}

/// IML `<sourceFolder>` relative to the module directory.
pub fn source_folder(dstdir: &str) -> Result<String> {
    let url = format!("file://$MODULE_DIR$/{dstdir}");
    let xml = empty_element(
        "sourceFolder",
        &[("url", url.as_str()), ("isTestSource", "false")],
    )?;
    Ok(indented(&xml, IML_SOURCE_FOLDER_INDENT))
}

/// Gradle dependency on a sibling project.
pub fn gradle_project_dependency(module: &str) -> String {
    format!("    compile project(':{module}')\n")
}

pub fn gradle_src_dir(dstdir: &str) -> String {
    format!("                srcDir '{dstdir}'\n")
}

pub fn gradle_exclude(pattern: &str) -> String {
    format!("                exclude '{pattern}'\n")
}

#[cfg(test)]
#[path = "markup_tests.rs"]
mod tests;
