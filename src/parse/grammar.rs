use winnow::combinator::{cut_err, preceded, repeat, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use crate::FieldSelector;

// -- Whitespace -------------------------------------------------------------

fn ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., char::is_whitespace)
        .void()
        .parse_next(input)
}

// -- Identifiers ------------------------------------------------------------

fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c != ',' && c != ':' && !c.is_whitespace()).parse_next(input)
}

fn selector_value<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(0.., |c: char| c != ',' && c != ':')
        .map(str::trim_end)
        .parse_next(input)
}

fn selector(input: &mut &str) -> ModalResult<FieldSelector> {
    ws.parse_next(input)?;

    let field = cut_err(name)
        .context(StrContext::Expected(StrContextValue::Description(
            "field name",
        )))
        .parse_next(input)?;

    let values: Vec<&str> = repeat(0.., preceded(':', selector_value)).parse_next(input)?;

    ws.parse_next(input)?;

    Ok(FieldSelector::new(field).with_values(values))
}

// -- Top-level parser -------------------------------------------------------

pub fn field_spec(input: &mut &str) -> ModalResult<Vec<FieldSelector>> {
    separated(1.., selector, ',').parse_next(input)
}

#[cfg(test)]
mod tests {
    use crate::parse::parse_field_spec;

    #[test]
    fn parse_single_name() {
        let sels = parse_field_spec("text-1").unwrap();
        assert_eq!(sels.len(), 1);
        assert_eq!(sels[0].name(), "text-1");
        assert!(sels[0].values().is_empty());
    }

    #[test]
    fn parse_multiple_names_with_whitespace() {
        let sels = parse_field_spec(" checkbox-1 , text-17 ").unwrap();
        let names: Vec<&str> = sels.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["checkbox-1", "text-17"]);
    }

    #[test]
    fn parse_value_selectors() {
        let sels = parse_field_spec("multicheckbox-1:abc:xyz,radiobutton-2:hij").unwrap();
        assert_eq!(sels[0].name(), "multicheckbox-1");
        assert_eq!(sels[0].values(), ["abc", "xyz"]);
        assert_eq!(sels[1].name(), "radiobutton-2");
        assert_eq!(sels[1].values(), ["hij"]);
    }

    #[test]
    fn parse_value_with_inner_space() {
        let sels = parse_field_spec("city:New York ").unwrap();
        assert_eq!(sels[0].values(), ["New York"]);
    }

    #[test]
    fn parse_empty_value_selector() {
        let sels = parse_field_spec("radio-1:").unwrap();
        assert_eq!(sels[0].values(), [""]);
    }

    #[test]
    fn parse_form_alias() {
        let sels = parse_field_spec("<form>").unwrap();
        assert_eq!(sels[0].name(), "<form>");
    }

    #[test]
    fn parse_error_on_empty_identifier() {
        assert!(parse_field_spec("a,,b").is_err());
        assert!(parse_field_spec("a,").is_err());
        assert!(parse_field_spec(":x").is_err());
    }

    #[test]
    fn parse_error_on_space_before_selector() {
        assert!(parse_field_spec("a :x").is_err());
    }
}
