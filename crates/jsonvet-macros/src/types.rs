//! Element type inference for field types.

use syn::{GenericArgument, PathArguments, Type};

/// Containers validated through their first type argument.
const WRAPPERS: &[&str] = &[
    "Option",
    "Vec",
    "Box",
    "Arc",
    "Rc",
    "VecDeque",
    "HashSet",
    "BTreeSet",
    "LinkedList",
    "BinaryHeap",
];

/// Types that never have a schema of their own.
const LEAVES: &[&str] = &[
    "String", "str", "bool", "char", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Value", "Number", "Map", "HashMap", "BTreeMap",
    "Cow", "PathBuf",
];

/// The type whose schema validates this field's object value or list
/// elements, if any.
///
/// `generics` are the struct's own type parameters, treated as leaves.
pub(crate) fn element_type<'a>(ty: &'a Type, generics: &[String]) -> Option<&'a Type> {
    match ty {
        Type::Path(tp) if tp.qself.is_none() => {
            let segment = tp.path.segments.last()?;
            let ident = segment.ident.to_string();
            if WRAPPERS.contains(&ident.as_str()) {
                return first_type_argument(&segment.arguments)
                    .and_then(|inner| element_type(inner, generics));
            }
            if LEAVES.contains(&ident.as_str()) || generics.contains(&ident) {
                return None;
            }
            Some(ty)
        }
        Type::Array(array) => element_type(&array.elem, generics),
        Type::Slice(slice) => element_type(&slice.elem, generics),
        Type::Reference(reference) => element_type(&reference.elem, generics),
        Type::Group(group) => element_type(&group.elem, generics),
        Type::Paren(paren) => element_type(&paren.elem, generics),
        _ => None,
    }
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}
