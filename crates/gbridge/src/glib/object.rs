wrapper! {
    /// The root object type. Also the wrapper used for native types with no
    /// registered ancestor.
    pub struct Object: "GObject";
}

wrapper! {
    /// Objects created with a floating reference that the first owner sinks.
    pub struct InitiallyUnowned: "GInitiallyUnowned", is_a [Object];
}
