//! Python bindings, built with the `python` feature
//!
//! Build the importable module with `extension-module`; `python` alone links
//! against libpython so the tests below can run an interpreter.
//!
//! Exposes the executor and helpers to scripts with the calling conventions
//! scripts expect: no exceptions for operational failures, a result/diagnostic
//! pair instead.
//!
//! ```text
//! (output, None) or (None, error) <- pipe3.pipe3([path, arg1, ...], stdin)
//! (line, nextpos) or (None, error) <- pipe3.hexline(data, pos)
//! 0 or 1                           <- pipe3.fullmkdir(path)
//! ```

use pipe3_core::{Pipe3Error, full_mkdir, hex_line_at};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyString};

type Reply = (Option<PyObject>, Option<PyObject>);

#[pyfunction]
#[pyo3(name = "pipe3", signature = (argv, stdin = None))]
fn py_pipe3(py: Python<'_>, argv: &PyAny, stdin: Option<&PyAny>) -> PyResult<Reply> {
    let reply = |result: std::result::Result<Vec<u8>, Vec<u8>>| -> Reply {
        match result {
            Ok(out) => (Some(PyBytes::new(py, &out).into_py(py)), None),
            Err(msg) => (None, Some(PyBytes::new(py, &msg).into_py(py))),
        }
    };

    // A bare string would extract as a sequence of characters; refuse it.
    if argv.is_instance_of::<PyString>() {
        return Ok(reply(Err(Pipe3Error::InvalidRequest.to_message_bytes())));
    }
    let Ok(argv) = argv.extract::<Vec<String>>() else {
        return Ok(reply(Err(Pipe3Error::InvalidRequest.to_message_bytes())));
    };

    let input = match stdin {
        Some(obj) => script_bytes(obj)?,
        None => Vec::new(),
    };

    let result = py.allow_threads(move || crate::pipe3(argv, &input));
    Ok(reply(result))
}

#[pyfunction]
#[pyo3(name = "hexline")]
fn py_hexline(py: Python<'_>, src: &PyAny, pos: i64) -> PyResult<(Option<String>, PyObject)> {
    let line = match string_bytes(src)? {
        Some(src) => usize::try_from(pos)
            .map_err(|_| Pipe3Error::HexPosition)
            .and_then(|pos| hex_line_at(&src, pos)),
        None => Err(Pipe3Error::HexSource),
    };

    Ok(match line {
        Ok((line, next)) => (Some(line), next.into_py(py)),
        Err(err) => (None, err.to_string().into_py(py)),
    })
}

#[pyfunction]
#[pyo3(name = "fullmkdir")]
fn py_fullmkdir(path: &str) -> i32 {
    match full_mkdir(path) {
        Ok(()) => 0,
        Err(err) => {
            log::debug!("{}", err);
            1
        }
    }
}

/// Bytes of a str or bytes object; `None` for anything else.
fn string_bytes(obj: &PyAny) -> PyResult<Option<Vec<u8>>> {
    if let Ok(bytes) = obj.downcast::<PyBytes>() {
        return Ok(Some(bytes.as_bytes().to_vec()));
    }
    if let Ok(text) = obj.downcast::<PyString>() {
        return Ok(Some(text.to_str()?.as_bytes().to_vec()));
    }
    Ok(None)
}

/// Bytes for str, bytes, or anything with a string form.
fn script_bytes(obj: &PyAny) -> PyResult<Vec<u8>> {
    match string_bytes(obj)? {
        Some(bytes) => Ok(bytes),
        None => Ok(obj.str()?.to_str()?.as_bytes().to_vec()),
    }
}

#[pymodule]
#[pyo3(name = "pipe3")]
fn init_module(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_pipe3, m)?)?;
    m.add_function(wrap_pyfunction!(py_hexline, m)?)?;
    m.add_function(wrap_pyfunction!(py_fullmkdir, m)?)?;
    Ok(())
}
