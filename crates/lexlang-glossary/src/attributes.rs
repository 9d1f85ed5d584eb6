//! The `\glssetcategoryattribute` command.

use crate::registry::Component;
use lexlang::prelude as lxl;
use lexlang::traits::*;
use lexlang::*;

pub const GLSSETCATEGORYATTRIBUTE_DOC: &str = "Set an attribute on a category";

/// Get the `\glssetcategoryattribute` command.
pub fn get_glssetcategoryattribute<S: HasComponent<Component>>() -> command::BuiltIn<S> {
    command::BuiltIn::new_immediate(glssetcategoryattribute_fn)
        .with_doc(GLSSETCATEGORYATTRIBUTE_DOC)
}

fn glssetcategoryattribute_fn<S: HasComponent<Component>>(
    _: token::Token,
    input: &mut vm::ExecutionInput<S>,
) -> lxl::Result<()> {
    let category = parse::parse_label(
        "reading the category of an attribute assignment",
        input.expanded(),
    )?;
    let attribute = parse::parse_label(
        "reading the attribute name of an attribute assignment",
        input.expanded(),
    )?;
    let mut value_tokens = vec![];
    parse::parse_balanced_group(
        "reading the value of an attribute assignment",
        input.unexpanded(),
        &mut value_tokens,
    )?;
    let value: String = value_tokens.iter().filter_map(token::Token::char).collect();
    input
        .state_mut()
        .component_mut()
        .set_category_attribute(&category, attribute, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::testing::*;
    use lexlang::command;
    use lexlang_testing::test_suite;
    use lexlang_testing::TestOption;
    use std::collections::HashMap;

    fn built_in_commands() -> HashMap<&'static str, command::BuiltIn<State>> {
        all_built_ins()
    }

    test_suite![
        expansion_equality_tests(
            (
                set_then_query,
                r"\glssetcategoryattribute{general}{nohyper}{true}\newglossaryentry{a}{name=a}\glsifattribute{a}{nohyper}{on}{off}",
                "on"
            ),
            (
                attribute_on_new_category,
                r"\glssetcategoryattribute{acronym}{nohyper}{true}\newglossaryentry{a}{name=a, category=acronym}\glsifattribute{a}{nohyper}{on}{off}",
                "on"
            ),
            (
                overwrite_attribute,
                r"\glssetcategoryattribute{general}{nohyper}{true}\glssetcategoryattribute{general}{nohyper}{false}\newglossaryentry{a}{name=a}\glsifattribute{a}{nohyper}{on}{off}",
                "off"
            ),
        ),
    ];
}
