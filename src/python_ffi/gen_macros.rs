/// Wraps an inner object that can be moved out exactly once, for classes that hand
/// their content over to another class (network -> trainer -> network).
#[macro_export]
macro_rules! MakeConsumable {
    ($name:ident,$inner_type:tt,$obj_name:ident) => {
        pub(super) struct $name {
            obj: Option<$inner_type>,
        }
        #[allow(dead_code)]
        impl $name {
            pub(super) fn acquire(val: $inner_type) -> Self {
                Self { obj: Some(val) }
            }
            fn get_ref(self: &Self) -> Result<&$inner_type, pyo3::PyErr> {
                self.obj.as_ref().ok_or_else(|| {
                    pyo3::exceptions::PyRuntimeError::new_err(std::stringify!(
                        This $obj_name object is consumed and cannot be used
                    ))
                })
            }
            fn get_ref_mut(self: &mut Self) -> Result<&mut $inner_type, pyo3::PyErr> {
                self.obj.as_mut().ok_or_else(|| {
                    pyo3::exceptions::PyRuntimeError::new_err(std::stringify!(
                        This $obj_name object is consumed and cannot be used
                    ))
                })
            }
            fn release(&mut self) -> Result<$inner_type, pyo3::PyErr> {
                self.obj.take().ok_or_else(|| {
                    pyo3::exceptions::PyRuntimeError::new_err(std::stringify!(
                        This $obj_name object is consumed and cannot be used
                    ))
                })
            }
        }
    };
}

/// Lets crate errors cross into Python as `ValueError`, so `?` works in `#[pymethods]`.
#[macro_export]
macro_rules! Impl_to_PyErr {
    (for $($t:ty),+) => {
        $(impl From<$t> for PyErr {
            fn from(err: $t) -> Self {
                pyo3::exceptions::PyValueError::new_err(format!("{}", err))
            }
        }
        )*
    }
}
