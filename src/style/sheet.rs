//! CSS parsing for the properties that decide perceivability.
//!
//! Only `display` and `visibility` are kept; every other declaration is
//! consumed and dropped.

use std::cmp::Ordering;

use cssparser::{
    AtRuleParser, DeclarationParser, ParseError, Parser, ParserInput, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser, StyleSheetParser,
};
use selectors::parser::Selector;

use super::{Display, Visibility};
use crate::dom::{ElementRef, PageSelectors, matches_any, parse_selector_list};

/// A parsed CSS stylesheet.
#[derive(Debug, Default, Clone)]
pub struct Stylesheet {
    pub rules: Vec<CssRule>,
}

/// A CSS rule with selectors and declarations.
#[derive(Debug, Clone)]
pub struct CssRule {
    pub selectors: Vec<Selector<PageSelectors>>,
    pub declarations: Vec<Declaration>,
}

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: Property,
    pub value: PropertyValue,
    pub important: bool,
}

/// Properties the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Display,
    Visibility,
}

/// Parsed CSS property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyValue {
    Display(Display),
    Visibility(Visibility),
    /// `inherit`, or `unset` on an inherited property.
    Inherit,
    /// `initial`, or `unset` on a non-inherited property.
    Initial,
}

/// CSS specificity for cascade ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Specificity {
    pub ids: u16,
    pub classes: u16,
    pub elements: u16,
}

impl Specificity {
    pub fn from_selector(selector: &Selector<PageSelectors>) -> Self {
        let spec = selector.specificity();
        // selectors crate packs specificity as (id << 20) | (class << 10) | elements
        Self {
            ids: ((spec >> 20) & 0x3FF) as u16,
            classes: ((spec >> 10) & 0x3FF) as u16,
            elements: (spec & 0x3FF) as u16,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ids
            .cmp(&other.ids)
            .then(self.classes.cmp(&other.classes))
            .then(self.elements.cmp(&other.elements))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Origin of a declaration, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    UserAgent = 0,
    Author = 1,
    /// The element's `style` attribute.
    Inline = 2,
}

/// A matched declaration with ordering information for the cascade.
#[derive(Debug)]
pub(super) struct MatchedDeclaration<'a> {
    pub declaration: &'a Declaration,
    pub origin: Origin,
    pub specificity: Specificity,
    pub order: usize,
}

impl MatchedDeclaration<'_> {
    /// Cascade order: later sorts win.
    pub fn cascade_cmp(&self, other: &Self) -> Ordering {
        self.declaration
            .important
            .cmp(&other.declaration.important)
            .then(self.origin.cmp(&other.origin))
            .then(self.specificity.cmp(&other.specificity))
            .then(self.order.cmp(&other.order))
    }
}

impl Stylesheet {
    /// Parse a CSS stylesheet from a string. Invalid rules are skipped.
    pub fn parse(css: &str) -> Self {
        let mut input = ParserInput::new(css);
        let mut parser = Parser::new(&mut input);
        let mut rules = Vec::new();

        let mut rule_parser = TopLevelRuleParser { rules: &mut rules };
        for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
            // Lenient parsing
            let _ = result;
        }

        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Declarations of every rule matching `elem`, tagged for the cascade.
    pub(super) fn matching<'a>(
        &'a self,
        elem: ElementRef<'_>,
        origin: Origin,
        order: &mut usize,
        out: &mut Vec<MatchedDeclaration<'a>>,
    ) {
        for rule in &self.rules {
            let mut best: Option<Specificity> = None;
            for selector in &rule.selectors {
                if matches_any(std::slice::from_ref(selector), elem) {
                    let spec = Specificity::from_selector(selector);
                    best = Some(best.map_or(spec, |b| b.max(spec)));
                }
            }
            if let Some(specificity) = best {
                for declaration in &rule.declarations {
                    out.push(MatchedDeclaration {
                        declaration,
                        origin,
                        specificity,
                        order: *order,
                    });
                    *order += 1;
                }
            }
        }
    }
}

/// Parse the declarations of a `style` attribute.
pub fn parse_inline_style(css: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser {
        declarations: &mut declarations,
    };
    for result in RuleBodyParser::new(&mut parser, &mut decl_parser) {
        let _ = result;
    }
    declarations
}

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser<'a> {
    rules: &'a mut Vec<CssRule>,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        // @media and friends depend on the viewport; skip them.
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser<'_> {
    type Prelude = Vec<Selector<PageSelectors>>;
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        parse_selector_list(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let mut declarations = Vec::new();
        let mut decl_parser = DeclarationListParser {
            declarations: &mut declarations,
        };
        for result in RuleBodyParser::new(input, &mut decl_parser) {
            let _ = result;
        }

        if !declarations.is_empty() {
            self.rules.push(CssRule {
                selectors: prelude,
                declarations,
            });
        }
        Ok(())
    }
}

struct DeclarationListParser<'a> {
    declarations: &'a mut Vec<Declaration>,
}

impl<'i> AtRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type AtRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        _name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser<'_> {
    type Prelude = ();
    type QualifiedRule = ();
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }

    fn parse_block<'t>(
        &mut self,
        _prelude: Self::Prelude,
        _start: &cssparser::ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        Err(input.new_custom_error(()))
    }
}

impl<'i> DeclarationParser<'i> for DeclarationListParser<'_> {
    type Declaration = ();
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: cssparser::CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &cssparser::ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let property = match name.to_ascii_lowercase().as_str() {
            "display" => Property::Display,
            "visibility" => Property::Visibility,
            _ => {
                while input.next().is_ok() {}
                return Ok(());
            }
        };

        let location = input.current_source_location();
        let keyword = input.expect_ident_cloned()?.to_ascii_lowercase();
        let value =
            parse_keyword(property, &keyword).ok_or_else(|| location.new_custom_error(()))?;
        let important = input.try_parse(cssparser::parse_important).is_ok();
        input.expect_exhausted()?;

        self.declarations.push(Declaration {
            property,
            value,
            important,
        });
        Ok(())
    }
}

impl<'i> RuleBodyItemParser<'i, (), ()> for DeclarationListParser<'_> {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

fn parse_keyword(property: Property, keyword: &str) -> Option<PropertyValue> {
    match (keyword, property) {
        ("inherit", _) | ("unset", Property::Visibility) => Some(PropertyValue::Inherit),
        ("initial", _) | ("unset", Property::Display) => Some(PropertyValue::Initial),
        (_, Property::Display) => Display::from_keyword(keyword).map(PropertyValue::Display),
        (_, Property::Visibility) => {
            Visibility::from_keyword(keyword).map(PropertyValue::Visibility)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rule() {
        let stylesheet = Stylesheet::parse(".sr-only { display: none; color: red; }");

        assert_eq!(stylesheet.rules.len(), 1);
        let rule = &stylesheet.rules[0];
        assert_eq!(rule.selectors.len(), 1);
        assert_eq!(
            rule.declarations,
            vec![Declaration {
                property: Property::Display,
                value: PropertyValue::Display(Display::None),
                important: false,
            }]
        );
    }

    #[test]
    fn test_rules_without_relevant_declarations_are_dropped() {
        let stylesheet = Stylesheet::parse("p { color: blue; font-weight: bold; }");
        assert!(stylesheet.is_empty());
    }

    #[test]
    fn test_parse_visibility_and_important() {
        let stylesheet = Stylesheet::parse("p { visibility: collapse !important; }");
        let decl = &stylesheet.rules[0].declarations[0];
        assert_eq!(decl.value, PropertyValue::Visibility(Visibility::Collapse));
        assert!(decl.important);
    }

    #[test]
    fn test_invalid_values_are_skipped() {
        let decls = parse_inline_style("display: bogus; visibility: hidden; display:");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, Property::Visibility);
    }

    #[test]
    fn test_inline_style_keywords() {
        let decls = parse_inline_style("DISPLAY: None; visibility: inherit");
        assert_eq!(decls[0].value, PropertyValue::Display(Display::None));
        assert_eq!(decls[1].value, PropertyValue::Inherit);
    }

    #[test]
    fn test_at_rules_are_skipped() {
        let stylesheet =
            Stylesheet::parse("@media print { nav { display: none } } main { display: block }");
        assert_eq!(stylesheet.rules.len(), 1);
    }

    #[test]
    fn test_specificity_ordering() {
        let id = Specificity {
            ids: 1,
            classes: 0,
            elements: 0,
        };
        let classes = Specificity {
            ids: 0,
            classes: 10,
            elements: 0,
        };
        let elements = Specificity {
            ids: 0,
            classes: 0,
            elements: 100,
        };

        assert!(id > classes);
        assert!(classes > elements);
    }
}
