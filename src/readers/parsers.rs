//! Small parsers for variable paths and names

// external crates
use nom::bytes::complete::tag;
use nom::character::complete::{anychar, digit1};
use nom::combinator::map_res;
use nom::multi::many_till;
use nom::sequence::preceded;
use nom::IResult;

/// Parses the first `meshN` occurrence of a path, returning the 1-based `N`
fn mesh_number(i: &str) -> IResult<&str, usize> {
    let (i, (_, number)) = many_till(
        anychar,
        preceded(tag("mesh"), map_res(digit1, str::parse::<usize>)),
    )(i)?;
    Ok((i, number))
}

/// Index of the mesh a variable path or mesh name refers to
///
/// Looks for the first `meshN` substring and returns `N - 1`, so that
/// `Primal (mesh2)/brick/sx` and `sand_mesh2` both belong to the second mesh.
///
/// ```rust
/// # use mili::readers::parsers::mesh_id;
/// assert_eq!(mesh_id("Primal (mesh2)/brick/sx"), Some(1));
/// assert_eq!(mesh_id("sand_mesh1"), Some(0));
/// assert_eq!(mesh_id("Primal/brick/sx"), None);
/// ```
pub fn mesh_id(path: &str) -> Option<usize> {
    mesh_number(path)
        .ok()
        .and_then(|(_, number)| number.checked_sub(1))
}

/// Element sets are named `es_<id>` in the sidecar
///
/// ```rust
/// # use mili::readers::parsers::is_element_set_name;
/// assert!(is_element_set_name("es_1a"));
/// assert!(!is_element_set_name("ess"));
/// ```
pub fn is_element_set_name(name: &str) -> bool {
    preceded(tag::<_, _, nom::error::Error<&str>>("es_"), anychar)(name).is_ok()
}
