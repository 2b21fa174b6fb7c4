// Internal macro implementations
//
// - peano: Arity aliases D0..Dn
// - name: Method name identities

pub mod name;
pub mod peano;
